//! ---
//! ems_section: "07-resilience-fault-tolerance"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Supervisor loop, schedule and fail-safe fault handling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use bsv_common::Timestamp;
use bsv_hal::{ClockError, ExternalClock, LocalClock};
use tracing::{info, warn};

/// External reference clock paired with the local clock it keeps in step.
#[derive(Debug)]
pub struct ClockLink<E, R> {
    external: E,
    local: R,
}

impl<E, R> ClockLink<E, R>
where
    E: ExternalClock,
    R: LocalClock,
{
    pub fn new(external: E, local: R) -> Self {
        Self { external, local }
    }

    /// Local wall-clock time.
    pub fn read(&self) -> Timestamp {
        self.local.now()
    }

    /// Copy the external reference time onto the local clock.
    pub fn sync(&mut self) -> Result<Timestamp, ClockError> {
        let before = self.local.now();
        let reference = self.external.read().inspect_err(|err| {
            warn!(error = %err, "external clock read failed");
        })?;
        self.local.set(reference).inspect_err(|err| {
            warn!(error = %err, "local clock write failed");
        })?;
        let drift_ms = (reference - before).num_milliseconds();
        info!(time = %reference, drift_ms, "clock synchronised");
        Ok(reference)
    }

    pub fn local(&self) -> &R {
        &self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Fixed(Result<Timestamp, ClockError>);

    impl ExternalClock for Fixed {
        fn read(&mut self) -> Result<Timestamp, ClockError> {
            self.0.clone()
        }
    }

    struct Local {
        now: Timestamp,
        reject: bool,
    }

    impl LocalClock for Local {
        fn now(&self) -> Timestamp {
            self.now
        }

        fn set(&mut self, time: Timestamp) -> Result<(), ClockError> {
            if self.reject {
                return Err(ClockError::LocalRejected("read-only".into()));
            }
            self.now = time;
            Ok(())
        }
    }

    fn at(hour: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn noon() -> Timestamp {
        at(12)
    }

    fn local() -> Local {
        Local {
            now: at(0),
            reject: false,
        }
    }

    #[test]
    fn sync_copies_reference_time() {
        let mut link = ClockLink::new(Fixed(Ok(noon())), local());
        assert_eq!(link.sync(), Ok(noon()));
        assert_eq!(link.read(), noon());
    }

    #[test]
    fn unreadable_reference_leaves_local_clock() {
        let mut link = ClockLink::new(
            Fixed(Err(ClockError::ExternalUnreadable("nak".into()))),
            local(),
        );
        assert!(matches!(link.sync(), Err(ClockError::ExternalUnreadable(_))));
        assert_eq!(link.read(), at(0));
    }

    #[test]
    fn rejected_write_is_reported() {
        let mut link = ClockLink::new(
            Fixed(Ok(noon())),
            Local {
                reject: true,
                ..local()
            },
        );
        assert!(matches!(link.sync(), Err(ClockError::LocalRejected(_))));
    }
}
