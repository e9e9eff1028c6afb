pub mod profit_loss;
