//! Provisions the sample course roster into a data directory.

use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use roster_provisioner::config::ProvisionSettings;
use roster_provisioner::domain::ports::DaemonController;
use roster_provisioner::domain::{Provisioner, ProvisioningPorts, ProvisioningReport};
use roster_provisioner::outbound::{
    CourseDirectoryMaterializer, DryRunAccountProvisioner, DryRunDaemonController,
    JsonSnapshotSink, QueueRegradeTrigger, SystemctlDaemonController, YamlDefinitionSource,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ProvisionSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load provisioning settings")?;
    let ports = open_ports(&settings)?;
    let provisioner = Provisioner::new(
        ports,
        Arc::new(DefaultClock),
        settings.context(),
        settings.options(),
    );
    let report = provisioner
        .run()
        .wrap_err("sample course provisioning failed")?;
    log_report(&report);
    Ok(())
}

fn open_ports(settings: &ProvisionSettings) -> Result<ProvisioningPorts> {
    let install_dir = utf8_dir(settings.install_dir())?;
    let data_dir = utf8_dir(settings.data_dir())?;

    let definitions = YamlDefinitionSource::open(&install_dir)
        .wrap_err("failed to open definition directory")?;
    let persistence =
        JsonSnapshotSink::open(&data_dir).wrap_err("failed to open snapshot store")?;
    let materializer = CourseDirectoryMaterializer::open(&data_dir)
        .wrap_err_with(|| format!("failed to open data directory {data_dir}"))?;
    let regrade = QueueRegradeTrigger::open(&data_dir).wrap_err("failed to open regrade queue")?;

    let units = settings.daemon_services();
    let daemons: Arc<dyn DaemonController> = if settings.manage_daemons {
        Arc::new(SystemctlDaemonController::new(units))
    } else {
        Arc::new(DryRunDaemonController::new(units))
    };

    Ok(ProvisioningPorts {
        definitions: Arc::new(definitions),
        accounts: Arc::new(DryRunAccountProvisioner),
        persistence: Arc::new(persistence),
        materializer: Arc::new(materializer),
        daemons,
        regrade: Arc::new(regrade),
    })
}

fn utf8_dir(path: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|raw| eyre!("directory path is not valid UTF-8: {}", raw.display()))
}

fn log_report(report: &ProvisioningReport) {
    for course in &report.courses {
        info!(
            course = %course.code,
            declared = course.declared,
            synthetic = course.synthetic,
            "course provisioned"
        );
    }
    info!(
        term = report.term.id(),
        real_users = report.real_users,
        synthetic_users = report.synthetic_users,
        skipped = report.skipped_user_ids.len(),
        regrade_enqueued = report.regrade_enqueued,
        "sample courses provisioned"
    );
}
