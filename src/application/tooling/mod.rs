mod catalog;
mod command;
mod executor;

#[cfg(test)]
mod tests;

pub use catalog::{
    API_REQUEST, CLICK, FILL_FORM, GET_TEXT, OPEN_URL, SCREENSHOT, catalog,
};
pub use command::{ApiRequestArgs, CommandError, ToolCommand};
pub use executor::ToolExecutor;
