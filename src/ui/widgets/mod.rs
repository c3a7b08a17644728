mod sparkline;

pub use sparkline::VolumeBars;
