//! Saved query catalog.
//!
//! Fixed Brick queries offered to presentation layers, plus the datasets
//! (buildings) the endpoint is known to serve. Pure data.

use serde::Serialize;

/// A named query body. Bodies carry no prefix block; the client adds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SavedQuery {
    pub name: &'static str,
    pub body: &'static str,
}

/// Datasets served by the reference endpoint.
pub const DATASETS: &[&str] = &["SodaHall", "RiceHall", "EBU3B", "Gates", "GreenTechCenter"];

/// Dataset used when none is given.
pub const DEFAULT_DATASET: &str = "SodaHall";

/// The saved queries, in display order.
pub const SAVED_QUERIES: &[SavedQuery] = &[
    SavedQuery {
        name: "Sensors in AHU",
        body: "SELECT ?ahu ?sensor\nWHERE {\n    ?ahu rdf:type/rdfs:subClassOf* brick:AHU .\n    ?ahu (bf:feeds|bf:hasPoint|bf:hasPart|bf:contains)* ?sensor .\n\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Reheat_Valve_Command }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Cooling_Valve_Command }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Mixed_Air_Temperature_Sensor }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Outside_Air_Temperature_Sensor }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Return_Air_Temperature_Sensor }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Supply_Air_Temperature_Sensor }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Outside_Air_Humidity_Sensor }\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Return_Air_Temperature_Sensor}\n    UNION\n    { ?sensor rdf:type/rdfs:subClassOf* brick:Outside_Air_Damper_Position_Sensor }\n}\n",
    },
    SavedQuery {
        name: "Zone Temperature Sensors",
        body: "SELECT DISTINCT ?sensor ?room\nWHERE {\n\n    ?sensor rdf:type/rdfs:subClassOf* brick:Zone_Temperature_Sensor .\n    ?room rdf:type brick:Room .\n    ?vav rdf:type brick:VAV .\n    ?zone rdf:type brick:HVAC_Zone .\n\n    ?vav bf:feeds+ ?zone .\n    ?zone bf:hasPart ?room .\n\n    {?sensor bf:isPointOf ?vav }\n    UNION\n    {?sensor bf:isPointOf ?room }\n}",
    },
    SavedQuery {
        name: "CO2, Occupancy Sensors",
        body: "SELECT DISTINCT ?sensor ?vav\nWHERE {\n\n      { ?sensor rdf:type/rdfs:subClassOf* brick:Occupancy_Sensor . }\n        UNION\n      { ?sensor rdf:type/rdfs:subClassOf* brick:CO2_Sensor . }\n\n    ?room rdf:type brick:Room .\n    ?sensor bf:isPointOf ?room .\n\n}",
    },
    SavedQuery {
        name: "Power Meters",
        body: "SELECT ?meter ?loc\nWHERE {\n    ?meter rdf:type/rdfs:subClassOf* brick:Power_Meter .\n    ?loc rdf:type ?loc_class .\n    ?loc_class rdfs:subClassOf+ brick:Location .\n\n    ?loc bf:hasPoint ?meter .\n}\n",
    },
    SavedQuery {
        name: "Equipment In Rooms",
        body: "SELECT ?equipment ?room\nWHERE {\n    ?room rdf:type brick:Room .\n\n    ?equipment bf:isLocatedIn ?room .\n\n    { ?equipment rdf:type/rdfs:subClassOf* brick:Lighting_System .}\n    UNION\n    { ?equipment rdf:type/rdfs:subClassOf* brick:Heating_Ventilation_Air_Conditioning_System .}\n}",
    },
    SavedQuery {
        name: "Reheat/Cool Valve cmd for VAV",
        body: "SELECT ?vlv_cmd ?vav\nWHERE {\n    {\n      { ?vlv_cmd rdf:type brick:Reheat_Valve_Command }\n      UNION\n      { ?vlv_cmd rdf:type brick:Cooling_Valve_Command }\n    }\n    ?vav rdf:type brick:VAV .\n    ?vav bf:hasPoint+ ?vlv_cmd .\n}\n",
    },
    SavedQuery {
        name: "Map VAVs to Zones and Rooms",
        body: "SELECT ?vav ?room\nWHERE {\n    ?vav rdf:type brick:VAV .\n    ?room rdf:type brick:Room .\n    ?zone rdf:type brick:HVAC_Zone .\n    ?vav bf:feeds+ ?zone .\n    ?room bf:isPartOf ?zone .\n}\n",
    },
    SavedQuery {
        name: "Map out floors, HVAC zones and rooms",
        body: "SELECT ?floor ?room ?zone\nWHERE {\n    ?floor rdf:type brick:Floor .\n    ?room rdf:type brick:Room .\n    ?zone rdf:type brick:HVAC_Zone .\n\n    ?room bf:isPartOf+ ?floor .\n    ?room bf:isPartOf+ ?zone .\n}",
    },
    SavedQuery {
        name: "Associate lighting with rooms",
        body: "SELECT DISTINCT ?light_equip ?light_state ?light_cmd ?room\nWHERE {\n\n    ?light_equip rdf:type/rdfs:subClassOf* brick:Lighting_System .\n\n    ?light_equip bf:feeds ?zone .\n    ?zone rdf:type brick:Lighting_Zone .\n    ?zone bf:contains ?room .\n    ?room rdf:type brick:Room .\n\n    ?light_state rdf:type/rdfs:subClassOf* brick:Luminance_Status .\n    ?light_cmd rdf:type/rdfs:subClassOf* brick:Luminance_Command .\n\n    {?light_equip bf:hasPoint ?light_state}\n    UNION\n    {?zone bf:hasPoint ?light_state}\n\n    {?light_equip bf:hasPoint ?light_cmd}\n    UNION\n    {?zone bf:hasPoint ?light_cmd}\n}",
    },
    SavedQuery {
        name: "Equipment and their power meters",
        body: "SELECT ?x ?meter\nWHERE {\n    ?meter rdf:type/rdfs:subClassOf* brick:Power_Meter .\n    ?meter (bf:isPointOf|bf:isPartOf)* ?x .\n    {?x rdf:type/rdfs:subClassOf* brick:Equipment .}\n    UNION\n    {?x rdf:type/rdfs:subClassOf* brick:Location .}\n}\n",
    },
    SavedQuery {
        name: "Equipment with power meters and control points",
        body: "SELECT DISTINCT ?equip ?cmd ?status\nWHERE {\n    ?equip  rdf:type/rdfs:subClassOf* brick:Equipment .\n    {\n    ?cmd rdf:type/rdfs:subClassOf*    brick:Command .\n    ?cmd (bf:isPointOf|bf:isPartOf)* ?equip .\n    }\n    UNION\n    {\n    ?status rdf:type/rdfs:subClassOf* brick:Status .\n    ?status (bf:isPointOf|bf:isPartOf)* ?equip .\n    }\n}",
    },
];

/// Find a saved query by name (case-insensitive).
pub fn find(name: &str) -> Option<&'static SavedQuery> {
    SAVED_QUERIES
        .iter()
        .find(|q| q.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = SAVED_QUERIES.iter().map(|q| q.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SAVED_QUERIES.len());
    }

    #[test]
    fn test_catalog_bodies_are_select_queries() {
        for query in SAVED_QUERIES {
            assert!(query.body.starts_with("SELECT"), "{}", query.name);
            assert!(!query.body.contains("PREFIX"), "{}", query.name);
            assert!(!query.body.contains("&lt;"), "{}", query.name);
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let query = find("power meters").unwrap();
        assert_eq!(query.name, "Power Meters");
        assert!(find("No Such Query").is_none());
    }

    #[test]
    fn test_default_dataset_is_known() {
        assert!(DATASETS.contains(&DEFAULT_DATASET));
    }
}
