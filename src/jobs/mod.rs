use crate::app_context::AppContext;
use crate::health::{ActiveEmitter, HttpSnapshotSource};

mod check;
mod config_reload;
mod scheduler;

pub(crate) use check::run_check_once;

pub fn start_background_jobs(
    app_context: AppContext,
    source: HttpSnapshotSource,
    emitter: ActiveEmitter,
) {
    check::start_check_job(app_context.clone(), source, emitter);
    config_reload::start_config_hot_reload_job(app_context);
}
