//! Product identity constants
//!
//! Names the platform uses to match and report the device. All naming
//! should reference these constants rather than hardcoding values.

/// Driver name registered with the platform.
pub const DRIVER_NAME: &str = "msm261";

/// Driver version reported at probe time.
pub const DRIVER_VERSION: &str = "1.0";

/// Device-description compatible string for the 7-microphone array.
pub const COMPATIBLE: &str = "msm,msm261s4030h0";

/// Human-readable part description.
pub const DESCRIPTION: &str = "MSM261S4030H0 7-mic array";

/// Prefix for every line label the driver exports.
pub const LINE_LABEL_PREFIX: &str = "MSM261";
