//! Registry of the record families the facade serves.
//!
//! The three families share one CRUD shape over different field sets, so
//! each is described as a `TableSchema` value and served by the generic
//! record handlers. Wire names, table names, and column spellings match the
//! original evaluasiws database so existing clients keep working unchanged.

use crate::database::table::{Column, ColumnKind, TableSchema};

const fn integer(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Integer)
}

const fn real(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Real)
}

const fn text(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Text)
}

/// Per-shift stevedoring performance rows: targets versus realized tonnage
/// for one vessel on one shift, with precomputed percentages.
pub static EVALUASI: TableSchema = TableSchema {
    resource: "evaluasi",
    table: "evaluasi",
    columns: &[
        text("tanggal"),
        text("shift"),
        text("kapal"),
        text("pelayaran"),
        integer("target_bongkar"),
        integer("realisasi_bongkar"),
        integer("target_muat"),
        integer("realisasi_muat"),
        real("persen_bongkar"),
        real("persen_muat"),
        text("keterangan"),
    ],
    supports_update: true,
    requires_api_key: false,
    strict_body: false,
};

/// Per-voyage planned quantities and times, loaded ahead of a vessel call.
pub static TARGET_DATA: TableSchema = TableSchema {
    resource: "target_data",
    table: "target_data",
    columns: &[
        text("pelayaran"),
        text("kodeWS"),
        text("periode"),
        text("waktuBerthing"),
        text("waktuDeparture"),
        text("berthingTime"),
        integer("targetBongkar"),
        integer("targetMuat"),
        text("createdAt"),
    ],
    supports_update: false,
    requires_api_key: true,
    strict_body: true,
};

/// Per-voyage realized quantities and times, recorded after a vessel call.
pub static REALISASI_DATA: TableSchema = TableSchema {
    resource: "realisasi_data",
    table: "realisasi_data",
    columns: &[
        text("pelayaran"),
        text("kodeWS"),
        text("namaKapal"),
        text("periode"),
        text("waktuArrival"),
        text("waktuBerthing"),
        text("waktuDeparture"),
        text("berthingTime"),
        integer("realisasiBongkar"),
        integer("realisasiMuat"),
        text("createdAt"),
    ],
    supports_update: false,
    requires_api_key: true,
    strict_body: true,
};

/// Every record family, in discovery order.
pub static RESOURCES: &[&TableSchema] = &[&EVALUASI, &TARGET_DATA, &REALISASI_DATA];

/// Resolve a wire resource name to its family, if it names one.
pub fn lookup(resource: &str) -> Option<&'static TableSchema> {
    RESOURCES.iter().copied().find(|schema| schema.resource == resource)
}
