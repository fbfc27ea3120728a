pub mod access;
pub mod ask;
pub mod backup;
pub mod goal;
pub mod investment;
pub mod prefs;
pub mod serve;
pub mod tx;
pub mod wheel;
