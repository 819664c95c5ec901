//! Simulator vocabulary.  Downstream tools match these byte-for-byte.

pub mod tag {
    pub const ADDITIONAL:     &str = "additional";
    pub const CALIBRATOR:     &str = "calibrator";
    pub const FLOW:           &str = "flow";
    pub const INDUCTION_LOOP: &str = "inductionLoop";
}

pub mod flow {
    pub const BEGIN:         &str = "begin";
    pub const END:           &str = "end";
    pub const ROUTE:         &str = "route";
    pub const VEHS_PER_HOUR: &str = "vehsPerHour";
    pub const SPEED:         &str = "speed";
    pub const TYPE:          &str = "type";
    pub const DEPART_POS:    &str = "departPos";
    pub const DEPART_SPEED:  &str = "departSpeed";
    pub const ARRIVAL_POS:   &str = "arrivalPos";
    pub const ARRIVAL_SPEED: &str = "arrivalSpeed";
}

pub mod calibrator {
    pub const ID:            &str = "id";
    pub const EDGE:          &str = "edge";
    pub const LANE:          &str = "lane";
    pub const POS:           &str = "pos";
    pub const OUTPUT:        &str = "output";
    pub const PERIOD:        &str = "period";
    pub const ROUTE_PROBE:   &str = "routeProbe";
    pub const JAM_THRESHOLD: &str = "jamThreshold";
    pub const V_TYPES:       &str = "vTypes";
}

pub mod induction_loop {
    pub const ID:             &str = "id";
    pub const LANE:           &str = "lane";
    pub const POS:            &str = "pos";
    pub const FILE:           &str = "file";
    pub const LENGTH:         &str = "length";
    pub const PERIOD:         &str = "period";
    pub const FRIENDLY_POS:   &str = "friendlyPos";
    pub const V_TYPES:        &str = "vTypes";
    pub const NEXT_EDGES:     &str = "nextEdges";
    pub const DETECT_PERSONS: &str = "detectPersons";
}

pub mod schema {
    pub const XMLNS_XSI:          &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const ADDITIONAL_XSD:     &str = "http://sumo.dlr.de/xsd/additional_file.xsd";
}
