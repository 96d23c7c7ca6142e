pub mod dispatcher;
pub mod messager;
pub mod messenger;
pub mod update;
