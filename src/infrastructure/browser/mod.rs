mod broker;
mod driver;

pub use broker::{AgentCoreBroker, BrokerError, BrowserSession, SessionBroker};
pub use driver::{CdpDriverFactory, CdpPageDriver, DriverError, PageDriver, PageDriverFactory};
