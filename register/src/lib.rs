pub mod address;
pub mod enums;
pub mod error;
pub mod store;
pub mod table;
pub mod value;
pub mod watch;
pub mod window;

pub use address::{canonical_address, reference};
pub use enums::Bank;
pub use error::{Error, ParseError};
pub use store::RegisterStore;
pub use table::{Cell, ValueTable};
pub use value::RegisterValue;
pub use watch::WatchGate;
pub use window::{BankConfig, Window};
