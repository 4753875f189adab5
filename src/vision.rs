//! Image primitives used by the camera-motion and team-color stages.
//!
//! Pure Rust on top of `ndarray`: frames are `(height, width, 3)` RGB arrays and every
//! algorithm here works on owned or borrowed views of them.

mod corners;
mod flow;
mod image;
mod kmeans;

pub use corners::{CornerParams, good_features_to_track};
pub use flow::LucasKanade;
pub use image::{FrameImage, GrayImage, Pyramid, crop_pixels};
pub use kmeans::{TwoMeans, two_means};
