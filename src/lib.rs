//! tomcat-home - Tomcat layer contributor for buildpacks
//!
//! Installs a resolved Apache Tomcat archive into a cacheable layer,
//! comments out the `CLASSPATH=` reset in `catalina.sh`, points
//! `CATALINA_HOME` at the layer for launch and declares the
//! application's process types.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod dependency;
pub mod error;
pub mod home;
pub mod layer;
pub mod ui;

pub use error::{TomcatError, TomcatResult};
pub use home::{CatalinaHome, Contribution};
