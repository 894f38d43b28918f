//! Well-known metric aliases.
//!
//! Edge nodes commonly reserve the low aliases for control metrics and a handful of node and device slots. These
//! constants are meant for [`Metric::with_alias`](crate::Metric::with_alias) and for matching on
//! [`Metric::alias`](crate::Metric::alias).

/// `Node Control/Next Server`.
pub const NEXT_SERVER: u64 = 0;

/// `Node Control/Rebirth`.
pub const REBIRTH: u64 = 1;

/// `Node Control/Reboot`.
pub const REBOOT: u64 = 2;

/// The node's data set metric.
pub const DATASET: u64 = 3;

/// First node metric. Node metrics take the four aliases starting here.
pub const NODE_METRIC_0: u64 = 4;
/// Second node metric.
pub const NODE_METRIC_1: u64 = 5;
/// Third node metric.
pub const NODE_METRIC_2: u64 = 6;
/// Fourth node metric.
pub const NODE_METRIC_3: u64 = 7;

/// First device metric. Device metrics take the four aliases starting here.
pub const DEVICE_METRIC_0: u64 = 8;
/// Second device metric.
pub const DEVICE_METRIC_1: u64 = 9;
/// Third device metric.
pub const DEVICE_METRIC_2: u64 = 10;
/// Fourth device metric.
pub const DEVICE_METRIC_3: u64 = 11;

/// First alias free for application use.
pub const CUSTOM_0: u64 = 12;

/// Returns the name of a well-known alias, if `alias` is one.
pub fn well_known_name(alias: u64) -> Option<&'static str> {
    let name = match alias {
        NEXT_SERVER => "Next_Server",
        REBIRTH => "Rebirth",
        REBOOT => "Reboot",
        DATASET => "Dataset",
        NODE_METRIC_0 => "Node_Metric0",
        NODE_METRIC_1 => "Node_Metric1",
        NODE_METRIC_2 => "Node_Metric2",
        NODE_METRIC_3 => "Node_Metric3",
        DEVICE_METRIC_0 => "Device_Metric0",
        DEVICE_METRIC_1 => "Device_Metric1",
        DEVICE_METRIC_2 => "Device_Metric2",
        DEVICE_METRIC_3 => "Device_Metric3",
        CUSTOM_0 => "Custom0",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataType, Metric, Payload};

    #[test]
    fn names() {
        assert_eq!(well_known_name(REBIRTH), Some("Rebirth"));
        assert_eq!(well_known_name(DEVICE_METRIC_2), Some("Device_Metric2"));
        assert_eq!(well_known_name(CUSTOM_0), Some("Custom0"));
        assert_eq!(well_known_name(CUSTOM_0 + 1), None);
    }

    #[test]
    fn aliases_survive_the_tree() {
        let payload = Payload::new(
            1626170000000,
            vec![
                Metric::new("Node Control/Rebirth", DataType::Boolean, false)
                    .unwrap()
                    .with_alias(REBIRTH),
                Metric::unnamed(DataType::Double, 0.5).unwrap().with_alias(NODE_METRIC_1),
            ],
        )
        .unwrap();

        let tree = payload.serialize().unwrap();
        assert_eq!(tree["metrics"][0]["alias"], 1);
        assert_eq!(tree["metrics"][1]["alias"], 5);

        let parsed = Payload::parse(&tree).unwrap();
        let aliases = parsed.metrics().iter().filter_map(Metric::alias).collect::<Vec<_>>();
        assert_eq!(aliases, [REBIRTH, NODE_METRIC_1]);
        assert_eq!(well_known_name(aliases[1]), Some("Node_Metric1"));
    }
}
