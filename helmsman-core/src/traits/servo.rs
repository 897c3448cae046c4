//! Steering servo trait

/// Hobby servo positioned by angle
///
/// Pulse generation is up to the implementation; the caller only ever
/// passes angles already clamped to 0..=180.
pub trait ServoDriver {
    /// Error type for output operations
    type Error;

    /// Move the servo to `degrees`
    fn write_angle(&mut self, degrees: u8) -> Result<(), Self::Error>;
}
