use crate::transfer_function::TransferFunctionParams;

/// Rule for combining the samples along a ray into one final color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositingMode {
    FrontToBack,
    FirstHitPoint,
    MaxIntensity,
}

impl CompositingMode {
    pub fn from_code(code: u8) -> Option<CompositingMode> {
        match code {
            0 => Some(CompositingMode::FrontToBack),
            1 => Some(CompositingMode::FirstHitPoint),
            2 => Some(CompositingMode::MaxIntensity),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CompositingMode::FrontToBack => 0,
            CompositingMode::FirstHitPoint => 1,
            CompositingMode::MaxIntensity => 2,
        }
    }
}

/// What the ray marching pass writes to the screen.
///
/// `Volume` is the actual rendering; everything else is a debugging view of
/// one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Volume,
    EntryPoints,
    ExitPoints,
    RayDirection,
    TransferFunction,
    Slice,
    SliceWithTransferFunction,
}

impl OutputMode {
    pub fn from_code(code: u8) -> Option<OutputMode> {
        match code {
            0 => Some(OutputMode::Volume),
            1 => Some(OutputMode::EntryPoints),
            2 => Some(OutputMode::ExitPoints),
            3 => Some(OutputMode::RayDirection),
            4 => Some(OutputMode::TransferFunction),
            5 => Some(OutputMode::Slice),
            6 => Some(OutputMode::SliceWithTransferFunction),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            OutputMode::Volume => 0,
            OutputMode::EntryPoints => 1,
            OutputMode::ExitPoints => 2,
            OutputMode::RayDirection => 3,
            OutputMode::TransferFunction => 4,
            OutputMode::Slice => 5,
            OutputMode::SliceWithTransferFunction => 6,
        }
    }
}

/// Spherical camera parameters, angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

/// Snapshot of every user-tunable rendering parameter.
///
/// Owned and written by the host UI; the engine only ever reads it. A write
/// becomes visible to the next tick, intermediate values between two ticks
/// are not replayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Distance between ray samples, in normalized volume units
    pub step_size: f32,
    pub compositing: CompositingMode,
    pub output: OutputMode,
    pub camera: CameraParams,
    pub transfer: TransferFunctionParams,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            step_size: 0.01,
            compositing: CompositingMode::FrontToBack,
            output: OutputMode::Volume,
            camera: CameraParams {
                radius: 3.0,
                azimuth: 45.0,
                elevation: 60.0,
            },
            transfer: TransferFunctionParams::default(),
        }
    }
}

/// Tracks which cached derived state no longer matches the parameters.
///
/// A thread-confined value the host passes into every tick; both flags start
/// set so the first tick builds the table and renders a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyFlags {
    pub render: bool,
    pub table: bool,
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags {
            render: true,
            table: true,
        }
    }
}

impl DirtyFlags {
    /// Call after changing any parameter that affects the image
    pub fn mark_render(&mut self) {
        self.render = true;
    }

    /// Call after changing any of the five transfer function parameters
    pub fn mark_table(&mut self) {
        self.table = true;
        self.render = true;
    }
}
