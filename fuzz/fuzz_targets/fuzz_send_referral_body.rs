//! Fuzz target: JSON deserialization of `SendReferralBody`.
//!
//! Arbitrary bytes fed to the body parser must never panic.

#![no_main]

use bridge_gateway::referrals::SendReferralBody;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<SendReferralBody>(data);
});
