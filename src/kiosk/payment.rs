//! Simulated QR payment modal
//!
//! `Closed → Open → Processing → Closed`, or back to `Open` when a payment is
//! abandoned before it settles. While processing, the modal cannot
//! be dismissed and a second confirmation is refused.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    #[default]
    Closed,
    Open,
    Processing,
}

/// Why a payment step was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRefusal {
    NotOpen,
    InFlight,
}

impl PaymentState {
    pub fn open(&mut self) -> Result<(), PaymentRefusal> {
        match self {
            PaymentState::Processing => Err(PaymentRefusal::InFlight),
            _ => {
                *self = PaymentState::Open;
                Ok(())
            }
        }
    }

    pub fn dismiss(&mut self) -> Result<(), PaymentRefusal> {
        match self {
            PaymentState::Processing => Err(PaymentRefusal::InFlight),
            _ => {
                *self = PaymentState::Closed;
                Ok(())
            }
        }
    }

    /// Start processing; only valid from `Open`
    pub fn begin(&mut self) -> Result<(), PaymentRefusal> {
        match self {
            PaymentState::Open => {
                *self = PaymentState::Processing;
                Ok(())
            }
            PaymentState::Processing => Err(PaymentRefusal::InFlight),
            PaymentState::Closed => Err(PaymentRefusal::NotOpen),
        }
    }

    pub fn finish(&mut self) {
        *self = PaymentState::Closed;
    }

    /// A payment that never settled goes back to the open modal
    pub fn abandon(&mut self) {
        if *self == PaymentState::Processing {
            *self = PaymentState::Open;
        }
    }

    pub fn is_processing(self) -> bool {
        self == PaymentState::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abandon_reopens_only_processing() {
        let mut state = PaymentState::Open;
        state.begin().unwrap();
        state.abandon();
        assert_eq!(state, PaymentState::Open);
        assert!(state.begin().is_ok());

        let mut closed = PaymentState::Closed;
        closed.abandon();
        assert_eq!(closed, PaymentState::Closed);
    }

    #[test]
    fn test_happy_path() {
        let mut state = PaymentState::default();
        state.open().unwrap();
        state.begin().unwrap();
        assert_eq!(state, PaymentState::Processing);
        state.finish();
        assert_eq!(state, PaymentState::Closed);
    }

    #[test]
    fn test_cannot_dismiss_or_reconfirm_while_processing() {
        let mut state = PaymentState::Open;
        state.begin().unwrap();
        assert_eq!(state.dismiss(), Err(PaymentRefusal::InFlight));
        assert_eq!(state.begin(), Err(PaymentRefusal::InFlight));
        assert_eq!(state.open(), Err(PaymentRefusal::InFlight));
    }

    #[test]
    fn test_confirm_requires_open_modal() {
        let mut state = PaymentState::Closed;
        assert_eq!(state.begin(), Err(PaymentRefusal::NotOpen));
        state.open().unwrap();
        state.dismiss().unwrap();
        assert_eq!(state, PaymentState::Closed);
    }
}
