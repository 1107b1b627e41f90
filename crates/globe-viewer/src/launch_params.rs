//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;
use globe_core::LatLng;

/// Launch parameters for the viewer.
#[derive(Resource, Debug, Clone, Default)]
pub struct LaunchParams {
    /// JSON file of message records to plot. Uses the built-in sample when absent.
    pub points: Option<PathBuf>,
    /// Globe texture asset path. `None` renders the plain globe.
    pub texture: Option<String>,
    /// Coordinate to frame once the scene is up.
    pub focus: Option<LatLng>,
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    /// Parse a latitude, rejecting values outside `[-90, 90]`.
    pub(super) fn parse_lat(s: &str) -> Result<f64, String> {
        parse_degrees(s, 90.0)
    }

    /// Parse a longitude, rejecting values outside `[-180, 180]`.
    pub(super) fn parse_lng(s: &str) -> Result<f64, String> {
        parse_degrees(s, 180.0)
    }

    fn parse_degrees(s: &str, limit: f64) -> Result<f64, String> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{s}': {e}"))?;
        if !value.is_finite() || value.abs() > limit {
            return Err(format!("{value} is outside [-{limit}, {limit}]"));
        }
        Ok(value)
    }

    #[derive(Parser)]
    #[command(about = "Interactive 3D globe for geotagged messages")]
    struct CliArgs {
        /// JSON file with message records (`id`, `message`, `lat`, `lng`).
        #[arg(long)]
        points: Option<PathBuf>,

        /// Equirectangular globe texture, relative to the asset directory.
        #[arg(long)]
        texture: Option<String>,

        /// Latitude to frame on startup.
        #[arg(long, value_parser = parse_lat, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,

        /// Longitude to frame on startup.
        #[arg(long, value_parser = parse_lng, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            points: args.points,
            texture: args.texture,
            focus: args.lat.zip(args.lng).map(|(lat, lng)| LatLng::new(lat, lng)),
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
