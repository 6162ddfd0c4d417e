// Shared tuning constants for shape generation, morphing, audio and gesture mapping.

// Session defaults
pub const DEFAULT_PARTICLE_COUNT: usize = 20_000;
pub const DEFAULT_RADIUS: f32 = 10.0;
pub const DEFAULT_POINT_SIZE: f32 = 0.35;
pub const DEFAULT_SENSITIVITY: f32 = 1.0;
pub const DEFAULT_PIXEL_DENSITY: f32 = 1.0;

// Default palette: core, rim and beat-flash accent
pub const DEFAULT_PRIMARY_COLOR: [f32; 3] = [1.0, 0.42, 0.71]; // pink
pub const DEFAULT_SECONDARY_COLOR: [f32; 3] = [0.27, 0.55, 1.0]; // blue
pub const DEFAULT_ACCENT_COLOR: [f32; 3] = [1.0, 1.0, 1.0]; // white flash

// Output bound enforced on every generated point, in multiples of the radius
pub const SHAPE_MAGNITUDE_LIMIT: f32 = 2.0;

// Per-particle jitter assigned at creation
pub const SCALE_FACTOR_MIN: f32 = 0.5;
pub const SCALE_FACTOR_SPAN: f32 = 1.0;

// Cake overlays, as fractions of the particle index range
pub const CAKE_TIER_FRACTION: f32 = 0.55; // bottom tier below, top tier above
pub const CAKE_PIPING_FRACTION: f32 = 0.90; // top tier up to here
pub const CAKE_CANDLE_FRACTION: f32 = 0.95; // piping up to here
pub const CAKE_FLAME_FRACTION: f32 = 0.98; // candle bodies up to here, flames above
pub const CAKE_CANDLE_COUNT: usize = 6;
pub const CAKE_PIPING_WAVES: f32 = 20.0;

// Morph speed: base plus treble boost, applied as an exponential approach
pub const MORPH_SPEED_BASE: f32 = 0.03;
pub const MORPH_SPEED_TREBLE_GAIN: f32 = 0.05;

// Gesture-driven frame transform
pub const GESTURE_SCALE_MIN: f32 = 0.1;
pub const GESTURE_SCALE_SPAN: f32 = 1.8;
pub const GESTURE_TWIST_THRESHOLD: f32 = 0.9;
pub const GESTURE_TWIST_GAIN: f32 = 4.0;
pub const GESTURE_TWIST_RADIUS: f32 = 15.0;
pub const GESTURE_RIPPLE_FREQ: f32 = 0.5;
pub const GESTURE_RIPPLE_SPEED: f32 = 2.0;

// Idle breathing
pub const BREATH_RATE: f32 = 0.1;
pub const BREATH_AMPLITUDE: f32 = 0.2;

// Beat explosion
pub const EXPLOSION_THRESHOLD: f32 = 0.01;
pub const EXPLOSION_GAIN: f32 = 5.0;
pub const VIBRATION_RATE: f32 = 20.0;
pub const VIBRATION_GAIN: f32 = 0.5;

// Point sprite sizing and shading
pub const POINT_AUDIO_GAIN: f32 = 1.5;
pub const POINT_ATTENUATION: f32 = 300.0; // pixels per unit size at unit depth
pub const POINT_FOOTPRINT_RADIUS: f32 = 0.5;
pub const FALLOFF_EXPONENT: f32 = 2.5;
pub const HUE_JITTER_RADIANS: f32 = 0.35;
pub const ALPHA_BASE: f32 = 0.6;
pub const ALPHA_TREBLE_GAIN: f32 = 0.4;

// Spectrum partitioning (fractions of the bin count)
pub const BASS_END_FRACTION: f32 = 0.1;
pub const MID_END_FRACTION: f32 = 0.5;
pub const SILENCE_DECAY: f32 = 0.9;

// Percussive "pop" derivation from bass
pub const POP_NOISE_GATE: f32 = 0.2;
pub const POP_EXPONENT: i32 = 3;
pub const POP_SMOOTHING: f32 = 0.3;

// Analyser defaults (mirrors a browser AnalyserNode)
pub const ANALYSER_FFT_SIZE: usize = 512;
pub const ANALYSER_SMOOTHING: f32 = 0.8;
pub const ANALYSER_MIN_DB: f32 = -100.0;
pub const ANALYSER_MAX_DB: f32 = -30.0;

// Pinch mapping
pub const PALM_REFERENCE_FLOOR: f32 = 0.1;
pub const PINCH_RANGE_MIN: f32 = 0.2;
pub const PINCH_RANGE_MAX: f32 = 1.2;
pub const MODEL_RETRY_DELAY_MS: u64 = 1_000;

// Camera
pub const CAMERA_DISTANCE: f32 = 30.0;
pub const CAMERA_FOVY_DEGREES: f32 = 60.0;
pub const CAMERA_ORBIT_RATE: f32 = 0.1; // radians per second
