use std::path::Path;

/// Display rotation in counter-clockwise quarter turns, derived from the
/// EXIF orientation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Maps the EXIF orientation values the viewer honours (3, 6, 8) onto
    /// quarter turns. Mirrored orientations and value 1 display unrotated.
    pub fn from_exif(orientation: u32) -> Rotation {
        match orientation {
            3 => Rotation::Half,
            6 => Rotation::ThreeQuarter,
            8 => Rotation::Quarter,
            _ => Rotation::None,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 1,
            Rotation::Half => 2,
            Rotation::ThreeQuarter => 3,
        }
    }

    pub fn radians(self) -> f32 {
        -(self.quarter_turns() as f32) * std::f32::consts::FRAC_PI_2
    }
}

#[derive(Debug, Default, Clone)]
pub struct ImageMetadata {
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub lens: Option<String>,
    pub iso: Option<u32>,
    pub shutter_speed: Option<String>,
    pub aperture: Option<String>,
    pub focal_length: Option<String>,
    pub date_taken: Option<String>,
    pub rotation: Rotation,
}

pub fn read(path: &Path) -> anyhow::Result<ImageMetadata> {
    let file = std::fs::File::open(path)?;
    let mut bufreader = std::io::BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader)?;

    let field = |tag| {
        exif.get_field(tag, exif::In::PRIMARY)
            .map(|f| f.display_value().to_string())
    };

    let rotation = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .map(Rotation::from_exif)
        .unwrap_or_default();

    Ok(ImageMetadata {
        camera_make: field(exif::Tag::Make),
        camera_model: field(exif::Tag::Model),
        lens: field(exif::Tag::LensModel),
        iso: exif
            .get_field(exif::Tag::PhotographicSensitivity, exif::In::PRIMARY)
            .and_then(|f| match f.value {
                exif::Value::Short(ref v) => v.first().map(|&x| x as u32),
                _ => None,
            }),
        shutter_speed: field(exif::Tag::ExposureTime),
        aperture: field(exif::Tag::FNumber),
        focal_length: field(exif::Tag::FocalLength),
        date_taken: field(exif::Tag::DateTimeOriginal),
        rotation,
    })
}
