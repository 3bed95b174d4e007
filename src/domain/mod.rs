mod blank;
mod document;
mod ledger;
mod money;
mod party;
mod transaction;

pub use blank::non_blank;
pub use document::*;
pub use ledger::*;
pub use money::*;
pub use party::*;
pub use transaction::*;
