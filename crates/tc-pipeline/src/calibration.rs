//! Sensor sites + measurements → calibrator directives.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use tc_measure::{RoadwaySensorMeasurement, SensorSite, aggregate_by_site, measurements_to_flows};
use tc_model::{AdditionalDocument, Calibrator, FlowTemplate, InductionLoop};
use tc_network::NetworkLocator;

/// Settings shared by every calibrator of one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalibrationSettings {
    /// Window width in seconds ending one second before each measurement.
    pub flow_period:   f64,
    /// Snap radius in metres.
    pub snap_radius_m: f64,
    /// Attributes copied onto every generated flow.
    pub template:      FlowTemplate,
    /// The calibrator's own aggregation `period` attribute.
    pub period:        Option<f64>,
    pub jam_threshold: Option<f64>,
    pub route_probe:   Option<String>,
    pub vehicle_types: Vec<String>,
}

/// One calibrator per site that both snaps onto the network and has
/// measurements, carrying that site's flows in measurement order.  Sites are
/// matched to measurements by site name; calibrators come out ordered by it.
pub fn build_calibrators(
    sites:        &[SensorSite],
    measurements: Vec<RoadwaySensorMeasurement>,
    locator:      &dyn NetworkLocator,
    settings:     &CalibrationSettings,
) -> Vec<Calibrator> {
    let by_name: BTreeMap<&str, &SensorSite> =
        sites.iter().map(|s| (s.count_point_name.as_str(), s)).collect();

    let mut calibrators = Vec::new();
    for (name, group) in aggregate_by_site(measurements) {
        let Some(site) = by_name.get(name.as_str()) else {
            warn!(site = %name, rows = group.len(), "measurements for unknown site");
            continue;
        };
        let Some(calibrator) = site.to_calibrator(locator, settings.snap_radius_m) else {
            warn!(site = %name, radius = settings.snap_radius_m, "site not on the network");
            continue;
        };
        let flows = measurements_to_flows(&group, settings.flow_period, &settings.template);
        debug!(site = %name, flows = flows.len(), "calibrator built");
        calibrators.push(configure(calibrator, settings).add_flows(flows));
    }
    calibrators
}

fn configure(mut c: Calibrator, settings: &CalibrationSettings) -> Calibrator {
    if let Some(period) = settings.period {
        c = c.with_period(period);
    }
    if let Some(threshold) = settings.jam_threshold {
        c = c.with_jam_threshold(threshold);
    }
    if let Some(probe) = &settings.route_probe {
        c = c.with_route_probe(probe.clone());
    }
    if !settings.vehicle_types.is_empty() {
        c = c.with_vehicle_types(settings.vehicle_types.iter().cloned());
    }
    c
}

/// Induction-loop detectors for every lane of every snapped site, all
/// writing to `output_file`.
pub fn build_detectors(
    sites:       &[SensorSite],
    locator:     &dyn NetworkLocator,
    radius_m:    f64,
    output_file: &Path,
) -> Vec<InductionLoop> {
    sites
        .iter()
        .flat_map(|site| site.to_induction_loops(locator, radius_m, output_file))
        .collect()
}

/// Wrap calibrators and detectors into one `<additional>` document.
pub fn additional_document(calibrators: &[Calibrator], detectors: &[InductionLoop]) -> AdditionalDocument {
    info!(calibrators = calibrators.len(), detectors = detectors.len(), "additional document assembled");
    AdditionalDocument::new()
        .extend(calibrators.iter().map(Calibrator::to_xml))
        .extend(detectors.iter().map(InductionLoop::to_xml))
}
