mod logging;
mod properties;
mod scenarios;
mod util;
