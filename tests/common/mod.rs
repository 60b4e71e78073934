//! Shared fixtures for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use bundlekit::prelude::*;
use bundlekit::TranslationError;

// =============================================================================
// CUSTOM TYPES
// =============================================================================

/// Geographic point, projected as `{lat, lon}`
#[derive(Debug, Clone, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl CustomValue for GeoPoint {
    fn type_name(&self) -> &'static str {
        "geo.Point"
    }

    fn to_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("lat".into(), Value::Float(self.lat));
        map.insert("lon".into(), Value::Float(self.lon));
        map
    }

    fn load_map(&mut self, map: ValueMap) -> std::result::Result<(), TranslationError> {
        if let Some(v) = map.get("lat") {
            self.lat = v.as_float()?;
        }
        if let Some(v) = map.get("lon") {
            self.lon = v.as_float()?;
        }
        Ok(())
    }

    fn new_empty(&self) -> Box<dyn CustomValue> {
        Box::new(GeoPoint::default())
    }

    fn as_string(&self) -> std::result::Result<String, TranslationError> {
        Ok(format!("{},{}", self.lat, self.lon))
    }
}

/// Counter with a single integer projection
#[derive(Debug, Clone, Default)]
pub struct Hits {
    pub total: i64,
}

impl CustomValue for Hits {
    fn type_name(&self) -> &'static str {
        "metrics.Hits"
    }

    fn to_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("total".into(), Value::Integer(self.total));
        map
    }

    fn load_map(&mut self, map: ValueMap) -> std::result::Result<(), TranslationError> {
        if let Some(v) = map.get("total") {
            self.total = v.as_integer()?;
        }
        Ok(())
    }

    fn new_empty(&self) -> Box<dyn CustomValue> {
        Box::new(Hits::default())
    }

    fn as_integer(&self) -> std::result::Result<i64, TranslationError> {
        Ok(self.total)
    }
}

pub fn point(lat: f64, lon: f64) -> Value {
    Value::Custom(Box::new(GeoPoint { lat, lon }))
}

pub fn hits(total: i64) -> Value {
    Value::Custom(Box::new(Hits { total }))
}

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Registry knowing every custom type above
pub fn registry() -> Arc<CustomRegistry> {
    let mut registry = CustomRegistry::new();
    registry.register::<GeoPoint>().register::<Hits>();
    Arc::new(registry)
}

/// Codec with default limits and the full registry
pub fn codec() -> Codec {
    Codec::new(registry())
}

/// Empty record on a fresh list format
pub fn list_record() -> ListRecord {
    ListRecord::new(Arc::new(ListFormat::new()))
}

/// Empty record on a fresh key/value format
pub fn kv_record() -> KvRecord {
    KvRecord::new(Arc::new(KvFormat::new()))
}

/// List record holding `pairs`
pub fn list_record_with(pairs: &[(&str, Value)]) -> ListRecord {
    let mut record = list_record();
    for (name, value) in pairs {
        record.set_named(name, Some(value.clone()));
    }
    record
}

/// Route test logs through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
