//! Default-parent policies applied when a create call omits its parent
//!
//! A spatial group without a temporal group lands in a root group matching
//! its type; a vertex without a spatial group lands in a group keyed by its
//! timeslot and type.

use chrono::{DateTime, Utc};

use crate::spatial_group::{NewSpatialGroup, SpatialGroupType};
use crate::temporal_group::{NewTemporalGroup, TemporalGroupType};
use crate::vertex::VertexType;

pub const DEFAULT_TOUR_GROUP: &str = "tour";
pub const DEFAULT_LANDMARK_GROUP: &str = "landmarks";

/// Root group receiving spatial groups created without a parent
pub fn temporal_group_for(group_type: SpatialGroupType) -> NewTemporalGroup {
    match group_type {
        SpatialGroupType::Landmark => NewTemporalGroup::new("Landmarks")
            .with_id(DEFAULT_LANDMARK_GROUP)
            .with_type(TemporalGroupType::Landmark),
        SpatialGroupType::Route | SpatialGroupType::Singleshot => NewTemporalGroup::new("Tour")
            .with_id(DEFAULT_TOUR_GROUP)
            .with_type(TemporalGroupType::Tour),
    }
}

/// Spatial group receiving a vertex created without one
pub fn spatial_group_for(vertex_type: VertexType, timeslot: DateTime<Utc>) -> NewSpatialGroup {
    let group_type = match vertex_type {
        VertexType::Landmark => SpatialGroupType::Landmark,
        VertexType::Panorama | VertexType::Placeholder => SpatialGroupType::Singleshot,
    };
    NewSpatialGroup::default()
        .with_id(NewSpatialGroup::timeslot_key(group_type, &timeslot))
        .with_type(group_type)
        .with_timeslot(timeslot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_landmark_groups_get_landmark_root() {
        let group = temporal_group_for(SpatialGroupType::Landmark);
        assert_eq!(group.id.unwrap().as_str(), DEFAULT_LANDMARK_GROUP);
        assert_eq!(group.group_type, TemporalGroupType::Landmark);

        let group = temporal_group_for(SpatialGroupType::Route);
        assert_eq!(group.id.unwrap().as_str(), DEFAULT_TOUR_GROUP);
    }

    #[test]
    fn test_vertex_group_is_keyed_by_timeslot_and_type() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let group = spatial_group_for(VertexType::Panorama, ts);
        assert_eq!(
            group.id.as_ref().unwrap().as_str(),
            "singleshot-20240302T100000000Z"
        );
        assert_eq!(group.timeslot, Some(ts));

        let group = spatial_group_for(VertexType::Landmark, ts);
        assert_eq!(group.group_type, SpatialGroupType::Landmark);
    }
}
