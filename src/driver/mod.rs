pub mod appium;

pub use appium::{AppiumClient, DriverSession, SessionError};
