use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use anyhow::{Result, Context};
use itertools::Itertools;
use rayon::ThreadPoolBuilder;
use tracing::*;
use structopt::StructOpt;

use icenet::*;
use icenet::data::{NsrInstance, get_instance_by_name, get_instance_from_file};
use icenet::ice::{derive_edge_conditions, PortGraphReport};
use icenet::network::Network;
use icenet::model::{formulate, MipModel, lp::write_lp_file};
use icenet::solve::{self, MipSolver, BranchAndBound, SolverConfig};
use icenet::schedule::Schedule;

mod common;
use common::*;

#[derive(Debug, Copy, Clone)]
enum SolverKind {
    Bnb,
    #[cfg(feature = "gurobi")]
    Gurobi,
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "bnb" => Ok(Self::Bnb),
            #[cfg(feature = "gurobi")]
            "gurobi" => Ok(Self::Gurobi),
            _ => Err(format!("unknown solver: {}", s))
        };
    }
}

impl SolverKind {
    fn build(self) -> Box<dyn MipSolver> {
        match self {
            SolverKind::Bnb => Box::new(BranchAndBound::default()),
            #[cfg(feature = "gurobi")]
            SolverKind::Gurobi => Box::new(solve::Gurobi::default()),
        }
    }
}

/// Plans icebreaker-assisted voyages over a time-expanded port network.
#[derive(Debug, StructOpt)]
struct ClArgs {
    /// Scenario JSON file, or a scenario name when --dataset is given
    #[structopt()]
    scenario: String,
    /// Directory with INDEX.txt and NAME.json scenario files
    #[structopt(long, short="d")]
    dataset: Option<PathBuf>,
    #[structopt(long, short="c", default_value="1", validator=clap_range_validator(Some(1), None))]
    cpus: usize,
    /// Routes kept per vessel when pruning edges
    #[structopt(long="k-bests", validator=clap_range_validator(Some(1), None))]
    k_bests: Option<usize>,
    /// Solver time limit in seconds
    #[structopt(long, validator=clap_range_validator(Some(1), None))]
    timelimit: Option<u64>,
    #[structopt(long="mip-gap", validator=clap_range_validator(Some(0.0), Some(0.999)))]
    mip_gap: Option<f64>,
    /// Keep edge lengths and severities as given instead of deriving them from the ice grid
    #[structopt(long="no-ice", parse(from_flag=std::ops::Not::not))]
    use_ice: bool,
    /// Solve the model and report the schedule
    #[structopt(long)]
    solve: bool,
    #[structopt(long, parse(try_from_str), possible_values=&["bnb", "gurobi"], default_value="bnb")]
    solver: SolverKind,
    /// Write the model in LP format
    #[structopt(long)]
    lp: Option<PathBuf>,
    #[structopt(flatten)]
    output: OutputOptions,
}

struct Run<'a> {
    network: &'a Network<'a>,
    model: &'a MipModel,
    ice: Option<PortGraphReport>,
    schedule: Option<Schedule>,
}

impl<'a> Run<'a> {
    fn header(&self) -> json::JsonValue {
        let data = self.network.data;
        let report = &self.network.report;
        let ids = |vs: &[usize]| vs.iter().map(|&v| data.vessels[v].id).collect_vec();
        let port_ids = |ps: &[usize]| ps.iter().map(|&p| data.ports[p].id).collect_vec();
        let mut root = json::object!{
            id: data.id.as_str(),
            size_info: self.network.size_info.clone(),
            vars: self.model.vars.len(),
            constraints: self.model.constraints.len(),
            vessels_without_route: ids(&report.vessels_without_route),
            vessels_outside_horizon: ids(&report.vessels_outside_horizon),
            isolated_ports: port_ids(&report.isolated_ports),
        };
        if let Some(ice) = &self.ice {
            root["ice"] = json::object!{
                snapshot: data.ice.as_ref().map(|s| s.label.as_str()),
                grid_edges: ice.grid_edges,
                port_links: ice.port_links,
                isolated_ports: port_ids(&ice.isolated_ports),
            };
        }
        root
    }
}

impl<'a> RunOutput for Run<'a> {
    fn write_json(&self, mut buf: impl Write) -> Result<()> {
        let mut root = self.header();
        if let Some(s) = &self.schedule {
            root["schedule"] = s.to_json(self.network.data);
        }
        root.write_pretty(&mut buf, 2)?;
        return Ok(())
    }

    fn write_json_summary(&self, mut buf: impl Write) -> Result<()> {
        let mut root = self.header();
        if let Some(s) = &self.schedule {
            root["schedule"] = s.summary_json(self.network.data);
        }
        root.write_pretty(&mut buf, 2)?;
        return Ok(())
    }
}

fn load(args: &ClArgs) -> Result<NsrInstance> {
    let mut data = match &args.dataset {
        Some(dir) => get_instance_by_name(dir, &args.scenario)?,
        None => get_instance_from_file(&args.scenario)?,
    };
    if let Some(k) = args.k_bests { data.config.k_bests = k; }
    if let Some(t) = args.timelimit { data.config.timelimit = t; }
    if let Some(g) = args.mip_gap { data.config.mip_gap = g; }
    data.config.validate().context("invalid scenario configuration")?;
    Ok(data)
}

fn main() -> Result<()> {
    let args: ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.as_ref())?;
    debug!(?args);
    ThreadPoolBuilder::new().num_threads(args.cpus).build_global()?;

    let mut data = load(&args)?;
    let ice = if args.use_ice {
        derive_edge_conditions(&mut data).map(|(report, _)| report)
    } else {
        None
    };
    let data = data;

    let network = Network::build(&data)?;
    if !network.report.is_clean() {
        warn!(report=?network.report, "some vessels cannot be served");
    }
    let model = formulate(&network);
    if let Some(path) = &args.lp {
        write_lp_file(&model, path)?;
        info!(?path, "wrote LP file");
    }

    let schedule = if args.solve {
        let solver = args.solver.build();
        match solve::solve(solver.as_ref(), &model, &SolverConfig::from_scenario(&data.config)) {
            Ok(a) => Some(Schedule::extract(&network, &model, &a)),
            Err(e) => {
                error!(
                    %e,
                    vessels_without_route=?network.report.vessels_without_route,
                    isolated_ports=?network.report.isolated_ports,
                    "no schedule for scenario {}", data.id
                );
                return Err(e).context(format!("solve scenario {}", data.id));
            }
        }
    } else {
        None
    };

    write_output(&args.output, &Run { network: &network, model: &model, ice, schedule })?;
    Ok(())
}
