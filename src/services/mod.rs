// rxportal services
// Services talk to the outside world: the hosted tables, the local store and the settings file.

pub mod local_store;
pub mod logging;
pub mod remote_store;
pub mod rest_client;
pub mod settings_engine;
