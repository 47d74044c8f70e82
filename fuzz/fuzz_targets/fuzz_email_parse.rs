//! Fuzz target: email address validation.
//!
//! A parsed address must parse again to the same normalised identity.

#![no_main]

use bridge_core::Email;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(email) = Email::parse(text) {
        let reparsed = Email::parse(email.as_str());
        assert!(matches!(reparsed, Ok(ref e) if *e == email));
    }
});
