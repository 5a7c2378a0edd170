#![doc = include_str!("../README.md")]

pub use self::{
	event::{ChangeEvent, ServicesState, StateChangedEvent},
	service::{Port, Service},
	status::ServiceStatus,
};

mod event;
mod serde_impls;
mod service;
mod status;
