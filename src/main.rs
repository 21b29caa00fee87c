// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ubikind::access::{ansible_inventory, exec_command};
use ubikind::cli::{Cli, ClusterCommand, Commands, ForwardCommand, MachineCommand, PodCommand};
use ubikind::cluster::{CreateOutcome, MachineResources};
use ubikind::config::Config;
use ubikind::constants::readiness::POLL_INTERVAL_MILLIS;
use ubikind::kubernetes::{delete_pod, pod_status, render_pod_yaml, wait_for_pod_ready};
use ubikind::orchestrator::Orchestrator;
use ubikind::process::{CommandRunner, SystemRunner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env()?;
    cli.overrides.apply(&mut config);
    debug!("Configuration loaded: {:?}", config);

    let orchestrator = Orchestrator::new(SystemRunner, config);
    run(&orchestrator, cli.command).await
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run<R: CommandRunner>(orchestrator: &Orchestrator<R>, command: Commands) -> Result<()> {
    let config = orchestrator.config();

    match command {
        Commands::Up { skip_machine } => {
            let summary = orchestrator.up(skip_machine).await?;
            info!("Port-forward running with pid {}", summary.forward_pid);
            println!("{}", summary.ssh.command());
        }
        Commands::Down { cluster } => orchestrator.down(cluster).await?,
        Commands::Machine(MachineCommand::Init { rootful }) => {
            orchestrator
                .machine()
                .init(MachineResources {
                    cpus: config.machine_cpus,
                    memory_mib: config.machine_memory_mib,
                    rootful,
                })
                .await?
        }
        Commands::Machine(MachineCommand::Start) => {
            orchestrator.machine().start().await?;
        }
        Commands::Machine(MachineCommand::Status) => {
            for machine in orchestrator.machine().status().await? {
                let state = if machine.running {
                    "running"
                } else if machine.starting {
                    "starting"
                } else {
                    "stopped"
                };
                let marker = if machine.default { "*" } else { "" };
                println!("{}{}\t{}", machine.name, marker, state);
            }
        }
        Commands::Cluster(ClusterCommand::Create) => {
            if orchestrator.kind().create_cluster(&config.cluster_name).await? == CreateOutcome::AlreadyExists {
                info!("Nothing to do");
            }
        }
        Commands::Cluster(ClusterCommand::Delete) => {
            orchestrator.kind().delete_cluster(&config.cluster_name).await?
        }
        Commands::Cluster(ClusterCommand::List) => {
            for name in orchestrator.kind().list_clusters().await? {
                println!("{}", name);
            }
        }
        Commands::Pod(PodCommand::Apply) => {
            let client = orchestrator.client().await?;
            orchestrator.apply(&client, &orchestrator.manifest_settings()?).await?;
        }
        Commands::Pod(PodCommand::Wait) => {
            let client = orchestrator.client().await?;
            wait_for_pod_ready(
                &client,
                &config.namespace,
                config.pod_name.as_str(),
                config.ready_timeout,
                Duration::from_millis(POLL_INTERVAL_MILLIS),
            )
            .await?;
        }
        Commands::Pod(PodCommand::Delete) => {
            let client = orchestrator.client().await?;
            delete_pod(&client, &config.namespace, config.pod_name.as_str()).await?;
        }
        Commands::Pod(PodCommand::Status) => {
            let client = orchestrator.client().await?;
            match pod_status(&client, &config.namespace, config.pod_name.as_str()).await? {
                Some(summary) => println!(
                    "{}\t{}\tready={}\t{}",
                    summary.name,
                    summary.phase,
                    summary.ready,
                    summary.pod_ip.as_deref().unwrap_or("-")
                ),
                None => bail!("Pod {}/{} not found", config.namespace, config.pod_name),
            }
        }
        Commands::Forward(ForwardCommand::Start) => {
            let pid = orchestrator.forwarder().start(&orchestrator.forward_target()).await?;
            println!("{}", pid);
        }
        Commands::Forward(ForwardCommand::Stop) => {
            orchestrator.forwarder().stop(&orchestrator.forward_target()).await?;
        }
        Commands::Exec { command } => {
            let cmd = exec_command(
                &config.cluster_name.kube_context(),
                &config.namespace,
                config.pod_name.as_str(),
                &command,
            );
            exit_with(SystemRunner.interactive(&cmd).await?);
        }
        Commands::Ssh { print } => {
            let cmd = orchestrator.ssh_target().command();
            if print {
                println!("{}", cmd);
            } else {
                exit_with(SystemRunner.interactive(&cmd).await?);
            }
        }
        Commands::Inventory => {
            let inventory = ansible_inventory(config.pod_name.as_str(), &orchestrator.ssh_target())?;
            print!("{}", inventory);
        }
        Commands::Manifest => {
            let yaml = render_pod_yaml(&orchestrator.manifest_settings()?)
                .context("Failed to render pod manifest")?;
            print!("{}", yaml);
        }
        Commands::Doctor => {
            let checks = orchestrator.doctor().await;
            for check in &checks {
                let mark = if check.ok { "ok" } else { "missing" };
                println!("{:<8} {:<8} {}", check.tool, mark, check.detail);
            }
            if checks.iter().any(|c| !c.ok) {
                bail!("Some required tools are missing or failing");
            }
        }
    }

    Ok(())
}

/// Mirror the exit code of an interactive child
fn exit_with(code: Option<i32>) {
    match code {
        Some(0) => {}
        Some(code) => std::process::exit(code),
        None => std::process::exit(1),
    }
}
