mod fsm;
mod session;

pub use fsm::{SendCycle, SendEvent, SendState};
pub use session::*;
