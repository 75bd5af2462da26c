use serde::{Deserialize, Serialize};

/// How the zoom level changes when a new image is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoomPolicy {
    /// Keep whatever zoom is active across files.
    Persistent,
    /// Restore the zoom the file had last time it was shown.
    #[default]
    PerFile,
    FitWidth,
    FitHeight,
    Actual,
}

/// Zoom applied under [`ZoomPolicy::PerFile`] when the file has no memory yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NewFileZoom {
    #[default]
    Fit,
    Actual,
}

/// How the pan offset changes when a new image is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    Persistent,
    PerFile,
    #[default]
    Center,
}

/// Pan/zoom a file was left at, remembered for the session.
#[derive(Debug, Clone, Copy)]
pub struct ViewMemory {
    pub pos: (f32, f32),
    pub scale: f32,
    pub manually_scaled: bool,
}

pub fn gcd(mut n: u32, mut m: u32) -> u32 {
    while n != 0 {
        let rem = m % n;
        m = n;
        n = rem;
    }
    m
}

/// Reduces `w:h` to its lowest terms, e.g. 1920x1080 -> (16, 9).
pub fn reduced_fraction(w: u32, h: u32) -> (u32, u32) {
    let d = gcd(w, h);
    if d == 0 {
        return (w, h);
    }
    (w / d, h / d)
}

/// Scale at which the whole image fits inside the window.
pub fn fit_scale(win: (f32, f32), img: (u32, u32)) -> f32 {
    if img.0 == 0 || img.1 == 0 {
        return 1.0;
    }
    (win.0 / img.0 as f32).min(win.1 / img.1 as f32)
}

pub fn fit_width_scale(win: (f32, f32), img: (u32, u32)) -> f32 {
    if img.0 == 0 {
        return 1.0;
    }
    win.0 / img.0 as f32
}

pub fn fit_height_scale(win: (f32, f32), img: (u32, u32)) -> f32 {
    if img.1 == 0 {
        return 1.0;
    }
    win.1 / img.1 as f32
}

/// Zoom to apply after a commit. `None` keeps the active zoom.
pub fn scale_for(
    policy: ZoomPolicy,
    new_file: NewFileZoom,
    win: (f32, f32),
    img: (u32, u32),
    memory: &ViewMemory,
) -> Option<f32> {
    match policy {
        ZoomPolicy::Persistent => None,
        ZoomPolicy::PerFile => {
            if memory.manually_scaled {
                Some(memory.scale)
            } else {
                match new_file {
                    NewFileZoom::Fit => Some(fit_scale(win, img)),
                    NewFileZoom::Actual => Some(1.0),
                }
            }
        }
        ZoomPolicy::FitWidth => Some(fit_width_scale(win, img)),
        ZoomPolicy::FitHeight => Some(fit_height_scale(win, img)),
        ZoomPolicy::Actual => Some(1.0),
    }
}

/// Pan offset to apply after a commit. `None` keeps the active offset.
pub fn position_for(policy: PositionPolicy, memory: &ViewMemory) -> Option<(f32, f32)> {
    match policy {
        PositionPolicy::Persistent => None,
        PositionPolicy::PerFile => Some(memory.pos),
        PositionPolicy::Center => Some((0.0, 0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_MEMORY: ViewMemory = ViewMemory {
        pos: (0.0, 0.0),
        scale: 1.0,
        manually_scaled: false,
    };

    #[test]
    fn full_hd_reduces_to_sixteen_nine() {
        assert_eq!(reduced_fraction(1920, 1080), (16, 9));
    }

    #[test]
    fn square_reduces_to_one_one() {
        assert_eq!(reduced_fraction(512, 512), (1, 1));
    }

    #[test]
    fn coprime_dimensions_stay_put() {
        assert_eq!(reduced_fraction(13, 7), (13, 7));
    }

    #[test]
    fn zero_dimension_is_left_alone() {
        assert_eq!(reduced_fraction(0, 0), (0, 0));
        assert_eq!(reduced_fraction(5, 0), (1, 0));
    }

    #[test]
    fn fit_scale_picks_the_tighter_axis() {
        // 200x100 image in a 100x100 window: width is the constraint.
        assert_eq!(fit_scale((100.0, 100.0), (200, 100)), 0.5);
        // 100x200 image: height is the constraint.
        assert_eq!(fit_scale((100.0, 100.0), (100, 200)), 0.5);
    }

    #[test]
    fn persistent_zoom_keeps_the_active_scale() {
        let s = scale_for(
            ZoomPolicy::Persistent,
            NewFileZoom::Fit,
            (100.0, 100.0),
            (50, 50),
            &NO_MEMORY,
        );
        assert_eq!(s, None);
    }

    #[test]
    fn per_file_zoom_prefers_remembered_scale() {
        let memory = ViewMemory {
            pos: (3.0, 4.0),
            scale: 2.5,
            manually_scaled: true,
        };
        let s = scale_for(
            ZoomPolicy::PerFile,
            NewFileZoom::Fit,
            (100.0, 100.0),
            (50, 50),
            &memory,
        );
        assert_eq!(s, Some(2.5));
    }

    #[test]
    fn per_file_zoom_without_memory_uses_new_file_setting() {
        let fit = scale_for(
            ZoomPolicy::PerFile,
            NewFileZoom::Fit,
            (100.0, 100.0),
            (200, 100),
            &NO_MEMORY,
        );
        assert_eq!(fit, Some(0.5));

        let actual = scale_for(
            ZoomPolicy::PerFile,
            NewFileZoom::Actual,
            (100.0, 100.0),
            (200, 100),
            &NO_MEMORY,
        );
        assert_eq!(actual, Some(1.0));
    }

    #[test]
    fn position_policies() {
        let memory = ViewMemory {
            pos: (7.0, -2.0),
            scale: 1.0,
            manually_scaled: false,
        };
        assert_eq!(position_for(PositionPolicy::Persistent, &memory), None);
        assert_eq!(
            position_for(PositionPolicy::PerFile, &memory),
            Some((7.0, -2.0))
        );
        assert_eq!(
            position_for(PositionPolicy::Center, &memory),
            Some((0.0, 0.0))
        );
    }
}
