mod order;
mod private_values;
mod quote;
mod side;
mod transaction;

pub use order::{NewOrder, Order, OrderSeq};
pub use private_values::PrivateValues;
pub use quote::{Quote, QuoteStatus};
pub use side::Side;
pub use transaction::{Transaction, TransactionKey};
