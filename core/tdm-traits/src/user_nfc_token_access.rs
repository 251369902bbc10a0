//! Enums of `weave.trait.security.UserNFCTokenAccessTrait`.

trait_enum! {
    /// Outcome of presenting an NFC token.
    pub enum UserNfcTokenAccessResult: "UserNFCTokenAccessResult" {
        Success = 1,
        FailureUnknownToken = 2,
        FailureInvalidToken = 3,
        FailureOutOfSchedule = 4,
        FailureTokenDisabled = 5,
        FailureInvalidVersion = 6,
        FailureOtherReason = 7,
    }
}

impl UserNfcTokenAccessResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UserNfcTokenAccessResult::Success)
    }
}
