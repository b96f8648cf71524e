//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---

/// Push-pull output pin. Writes cannot fail and the pin remembers its level.
pub trait DigitalOutput: Send {
    fn set_high(&mut self);

    fn set_low(&mut self);

    /// Level most recently written to the pin.
    fn is_set_high(&self) -> bool;
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Box<T> {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }

    fn is_set_high(&self) -> bool {
        (**self).is_set_high()
    }
}
