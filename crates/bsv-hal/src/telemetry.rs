//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use async_trait::async_trait;

use crate::error::TelemetryError;
use crate::frame::RequestFrame;
use crate::reading::BatteryReading;

/// Half-duplex serial link to the battery management unit, codec included.
#[async_trait]
pub trait TelemetryLink: Send {
    /// Send `frame` and decode the answer.
    async fn request(&mut self, frame: &RequestFrame) -> Result<BatteryReading, TelemetryError>;
}

#[async_trait]
impl<T: TelemetryLink + ?Sized> TelemetryLink for Box<T> {
    async fn request(&mut self, frame: &RequestFrame) -> Result<BatteryReading, TelemetryError> {
        (**self).request(frame).await
    }
}
