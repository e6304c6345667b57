//! Maps single input bytes to velocity commands
//!
//! The mapping is a static table over raw bytes. Arrow keys arrive as the
//! escape sequences `ESC [ A` and `ESC [ B`; the leading bytes are not
//! recognized and the final byte selects the scale action.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Final byte of the Up-arrow sequence
pub const KEY_UP: u8 = 0x41;
/// Final byte of the Down-arrow sequence
pub const KEY_DOWN: u8 = 0x42;
/// `a`; rotate counter-clockwise
pub const KEY_A: u8 = 0x61;
/// `d`; rotate clockwise
pub const KEY_D: u8 = 0x64;
/// `e`; curve right
pub const KEY_E: u8 = 0x65;
/// `q`; curve left
pub const KEY_Q: u8 = 0x71;
/// `s`; move backward
pub const KEY_S: u8 = 0x73;
/// `w`; move forward
pub const KEY_W: u8 = 0x77;
/// Space; full stop
pub const KEY_SPACE: u8 = 0x20;

/// Amount by which a single scale key changes `linear_scale`
pub const SCALE_STEP: f64 = 0.1;

/// Three-component vector
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

/// Twist-style velocity command
///
/// Only `linear.x` and `angular.z` are ever set by the mapper; every other
/// component stays zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    /// Linear velocity
    pub linear: Vector3,
    /// Angular velocity
    pub angular: Vector3,
}

impl Twist {
    /// Returns a command with every component zero.
    pub fn zero() -> Twist {
        Twist::default()
    }

    /// Returns a planar command: forward speed `linear_x` and yaw rate `angular_z`.
    pub fn planar(linear_x: f64, angular_z: f64) -> Twist {
        let mut twist = Twist::zero();
        twist.linear.x = linear_x;
        twist.angular.z = angular_z;
        twist
    }

    /// Returns whether every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Twist::zero()
    }
}

/// Scale factors applied to emitted commands
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaleFactors {
    /// Magnitude of every emitted field
    pub linear_scale: f64,
    /// Read from configuration but not used by any action
    pub angular_scale: f64,
}

impl ScaleFactors {
    /// Default value of `linear_scale`
    pub const DEFAULT_LINEAR: f64 = 0.6;
    /// Default value of `angular_scale`
    pub const DEFAULT_ANGULAR: f64 = 1.1;

    /// Creates scale factors with the given values.
    pub fn new(linear_scale: f64, angular_scale: f64) -> ScaleFactors {
        ScaleFactors{linear_scale, angular_scale}
    }
}

impl Default for ScaleFactors {
    fn default() -> ScaleFactors {
        ScaleFactors::new(ScaleFactors::DEFAULT_LINEAR, ScaleFactors::DEFAULT_ANGULAR)
    }
}

/// Action bound to a recognized key
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Increase `linear_scale`
    ScaleUp,
    /// Decrease `linear_scale`
    ScaleDown,
    /// Drive forward
    Forward,
    /// Drive backward
    Backward,
    /// Rotate counter-clockwise in place
    RotateLeft,
    /// Rotate clockwise in place
    RotateRight,
    /// Drive forward while turning left
    CurveLeft,
    /// Drive forward while turning right
    CurveRight,
    /// Stop all motion
    Stop,
}

/// Result of applying an `Action`
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Effect {
    /// `linear_scale` changed; contained value is the new scale.
    Scaled(f64),
    /// A command is to be emitted.
    Command(Twist),
}

impl Action {
    /// Returns the action bound to `byte`, if any.
    pub fn from_byte(byte: u8) -> Option<Action> {
        match byte {
            KEY_UP => Some(Action::ScaleUp),
            KEY_DOWN => Some(Action::ScaleDown),
            KEY_W => Some(Action::Forward),
            KEY_S => Some(Action::Backward),
            KEY_A => Some(Action::RotateLeft),
            KEY_D => Some(Action::RotateRight),
            KEY_Q => Some(Action::CurveLeft),
            KEY_E => Some(Action::CurveRight),
            KEY_SPACE => Some(Action::Stop),
            _ => None
        }
    }

    /// Applies the action to the current scale factors.
    ///
    /// Scale actions mutate `scales`; every other action builds a fresh
    /// command from `linear_scale`.
    pub fn apply(self, scales: &mut ScaleFactors) -> Effect {
        let scale = scales.linear_scale;

        match self {
            Action::ScaleUp => {
                scales.linear_scale += SCALE_STEP;
                Effect::Scaled(scales.linear_scale)
            }
            Action::ScaleDown => {
                scales.linear_scale -= SCALE_STEP;
                Effect::Scaled(scales.linear_scale)
            }
            Action::Forward => Effect::Command(Twist::planar(scale, 0.0)),
            Action::Backward => Effect::Command(Twist::planar(-scale, 0.0)),
            Action::RotateLeft => Effect::Command(Twist::planar(0.0, scale)),
            Action::RotateRight => Effect::Command(Twist::planar(0.0, -scale)),
            Action::CurveLeft => Effect::Command(Twist::planar(scale, scale)),
            Action::CurveRight => Effect::Command(Twist::planar(scale, -scale)),
            Action::Stop => Effect::Command(Twist::zero()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Action::ScaleUp => "scale-up",
            Action::ScaleDown => "scale-down",
            Action::Forward => "FRONT",
            Action::Backward => "BACK",
            Action::RotateLeft => "CCW",
            Action::RotateRight => "CW",
            Action::CurveLeft => "curveL",
            Action::CurveRight => "curveR",
            Action::Stop => "STOP",
        })
    }
}

/// Maps one input byte against the current scale factors.
///
/// Returns `None` for unrecognized bytes, leaving `scales` untouched.
pub fn map_byte(byte: u8, scales: &mut ScaleFactors) -> Option<(Action, Effect)> {
    let action = Action::from_byte(byte)?;
    Some((action, action.apply(scales)))
}

#[cfg(test)]
mod test {
    use rand::{thread_rng, Rng};

    use super::*;

    const EPSILON: f64 = 1e-9;

    const KEYS: &[u8] = &[
        KEY_UP, KEY_DOWN, KEY_W, KEY_S, KEY_A, KEY_D, KEY_Q, KEY_E, KEY_SPACE,
    ];

    fn command(byte: u8, scales: &mut ScaleFactors) -> Twist {
        match map_byte(byte, scales) {
            Some((_, Effect::Command(twist))) => twist,
            r => panic!("expected command for 0x{:02X}, got {:?}", byte, r)
        }
    }

    fn assert_unused_zero(twist: &Twist) {
        assert_eq!(twist.linear.y, 0.0);
        assert_eq!(twist.linear.z, 0.0);
        assert_eq!(twist.angular.x, 0.0);
        assert_eq!(twist.angular.y, 0.0);
    }

    #[test]
    fn test_mapping_table() {
        let mut scales = ScaleFactors::default();

        assert_eq!(command(KEY_W, &mut scales), Twist::planar(0.6, 0.0));
        assert_eq!(command(KEY_S, &mut scales), Twist::planar(-0.6, 0.0));
        assert_eq!(command(KEY_A, &mut scales), Twist::planar(0.0, 0.6));
        assert_eq!(command(KEY_D, &mut scales), Twist::planar(0.0, -0.6));
        assert_eq!(command(KEY_Q, &mut scales), Twist::planar(0.6, 0.6));
        assert_eq!(command(KEY_E, &mut scales), Twist::planar(0.6, -0.6));
        assert!(command(KEY_SPACE, &mut scales).is_zero());

        assert_eq!(scales, ScaleFactors::default());
    }

    #[test]
    fn test_scale_then_forward() {
        let mut scales = ScaleFactors::default();

        assert_eq!(map_byte(KEY_UP, &mut scales).map(|r| r.0), Some(Action::ScaleUp));
        map_byte(KEY_UP, &mut scales);

        assert!((scales.linear_scale - 0.8).abs() < EPSILON);

        let twist = command(KEY_W, &mut scales);

        assert!((twist.linear.x - 0.8).abs() < EPSILON);
        assert_eq!(twist.angular.z, 0.0);
        assert_unused_zero(&twist);
    }

    #[test]
    fn test_curve_left_default() {
        let mut scales = ScaleFactors::default();

        assert_eq!(command(b'q', &mut scales), Twist::planar(0.6, 0.6));
    }

    #[test]
    fn test_scale_unbounded() {
        let mut scales = ScaleFactors::default();

        for _ in 0..10 {
            map_byte(KEY_DOWN, &mut scales);
        }

        assert!((scales.linear_scale - -0.4).abs() < EPSILON);

        // A negative scale flips the direction of every command
        let twist = command(KEY_W, &mut scales);
        assert!((twist.linear.x - -0.4).abs() < EPSILON);
    }

    #[test]
    fn test_angular_scale_unused() {
        let mut scales = ScaleFactors::new(0.5, 3.0);

        assert_eq!(command(KEY_A, &mut scales), Twist::planar(0.0, 0.5));
        assert_eq!(command(KEY_E, &mut scales), Twist::planar(0.5, -0.5));
        assert_eq!(scales.angular_scale, 3.0);
    }

    #[test]
    fn test_unrecognized_bytes() {
        for byte in 0..=255u8 {
            if KEYS.contains(&byte) {
                continue;
            }

            let mut scales = ScaleFactors::default();

            assert_eq!(Action::from_byte(byte), None);
            assert_eq!(map_byte(byte, &mut scales), None);
            assert_eq!(scales, ScaleFactors::default());
        }
    }

    #[test]
    fn test_arrow_sequence() {
        let mut scales = ScaleFactors::default();

        // ESC [ A
        assert_eq!(map_byte(0x1b, &mut scales), None);
        assert_eq!(map_byte(b'[', &mut scales), None);
        assert_eq!(map_byte(b'A', &mut scales).map(|r| r.0), Some(Action::ScaleUp));

        assert!((scales.linear_scale - 0.7).abs() < EPSILON);
    }

    #[test]
    fn test_random_sequences() {
        let mut rng = thread_rng();

        for _ in 0..200 {
            let initial = rng.gen_range(-2.0..2.0);
            let mut scales = ScaleFactors::new(initial, 1.1);
            let mut ups = 0i32;
            let mut downs = 0i32;

            for _ in 0..rng.gen_range(1..64) {
                let byte = if rng.gen_bool(0.7) {
                    KEYS[rng.gen_range(0..KEYS.len())]
                } else {
                    rng.gen()
                };

                let before = scales.linear_scale;

                match map_byte(byte, &mut scales) {
                    None => assert_eq!(scales.linear_scale, before),
                    Some((Action::ScaleUp, Effect::Scaled(_))) => ups += 1,
                    Some((Action::ScaleDown, Effect::Scaled(_))) => downs += 1,
                    Some((action, Effect::Command(twist))) => {
                        assert_eq!(scales.linear_scale, before);
                        assert_unused_zero(&twist);

                        if action == Action::Stop {
                            assert!(twist.is_zero());
                            continue;
                        }

                        for &v in &[twist.linear.x, twist.angular.z] {
                            if v != 0.0 {
                                assert_eq!(v.abs(), before.abs());
                            }
                        }
                    }
                    r => panic!("unexpected result {:?}", r)
                }
            }

            let expected = initial + SCALE_STEP * f64::from(ups - downs);
            assert!((scales.linear_scale - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_twist_serialize() {
        let json = serde_json::to_value(Twist::planar(0.6, -0.6)).unwrap();

        assert_eq!(json["linear"]["x"], 0.6);
        assert_eq!(json["linear"]["y"], 0.0);
        assert_eq!(json["angular"]["z"], -0.6);
    }
}
