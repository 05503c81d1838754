use std::io::Read;

use truckio::{
    load_simdir, load_table, parse_table, table_path, write_binary, write_csv, write_population,
    write_trips, LoadedTable, TableKind, TABLE_NAMES,
};
use truckplans::{Facility, FacilityTable, OutputFormat, Point, Trip, TripID, TripRecord};
use truckutil::Timer;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("truckio_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn record(id: usize, origin: Point, destination: Point, departure: u64) -> TripRecord {
    Trip {
        origin,
        destination,
        sctg: "07".to_string(),
        config: "SU".to_string(),
        departure,
    }
    .number(TripID(id))
}

fn resolved(x: &str) -> Point {
    Point::Resolved(x.to_string())
}

#[test]
fn parse_every_table_kind() {
    let county = parse_table(
        "make_table",
        "F4Z,sctg,name,prob\n61,07,06001,0.25\n61,07,06013,0.75\n".as_bytes(),
    )
    .unwrap();
    assert_eq!(county.kind(), TableKind::County);
    let table = county.into_probabilities(TableKind::County).unwrap();
    assert_eq!(table.lookup("61", "07").unwrap().len(), 2);

    let local =
        parse_table("make_local", "county,sctg,numa,p\n06001,07,N1,1.0\n".as_bytes()).unwrap();
    assert_eq!(local.kind(), TableKind::Local);

    let ie = parse_table("ie_nodes", "F3Z,mode,name,prob\n61,1,LAX,1\n".as_bytes()).unwrap();
    assert_eq!(ie.kind(), TableKind::ImportExport);

    let facilities = parse_table(
        "facility_coords",
        "name,x,y,numa\nLAX,-118.4,33.9,N7\nSEA,-122.3,47.4,NA\n".as_bytes(),
    )
    .unwrap()
    .into_facilities()
    .unwrap();
    assert_eq!(facilities.len(), 2);
    assert_eq!(facilities.get("LAX").unwrap().numa, Some("N7".to_string()));
    assert_eq!(facilities.get("SEA").unwrap().numa, None);

    let flows = parse_table(
        "faf_trucks",
        "dms_orig,dms_dest,sctg,fr_inmode,fr_outmode,type,trucks\n61,411,07,,,SU,12.9\n"
            .as_bytes(),
    )
    .unwrap()
    .into_flows()
    .unwrap();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].trucks, 12);
    assert_eq!(flows[0].in_mode, "");
    assert_eq!(flows[0].config, "SU");
}

#[test]
fn repeated_rows_accumulate() {
    let table = parse_table(
        "use_table",
        "F4Z,sctg,name,prob\n61,07,06001,0.2\n61,07,06001,0.3\n".as_bytes(),
    )
    .unwrap()
    .into_probabilities(TableKind::County)
    .unwrap();
    let weights = table.lookup("61", "07").unwrap();
    assert!((weights["06001"] - 0.5).abs() < 1e-12);
}

#[test]
fn malformed_tables() {
    assert!(parse_table("x", "a,b\n1,2\n".as_bytes()).is_err());
    assert!(parse_table("x", "F4Z,sctg,name,prob\n61,07,06001,lots\n".as_bytes()).is_err());
    assert!(parse_table(
        "x",
        "dms_orig,dms_dest,sctg,fr_inmode,fr_outmode,type,trucks\n61,411,07,,,SU,-3\n".as_bytes()
    )
    .is_err());
    // The wrong kind of table in the wrong slot
    let local = parse_table("x", "county,sctg,numa,p\n06001,07,N1,1.0\n".as_bytes()).unwrap();
    assert!(local.into_probabilities(TableKind::County).is_err());
}

#[test]
fn binary_cache_is_preferred() {
    let dir = scratch_dir("cache");
    let csv_path = dir.join("make_table.csv");
    std::fs::write(&csv_path, "F4Z,sctg,name,prob\n61,07,06001,1\n").unwrap();
    let simdir = dir.to_string_lossy().to_string();
    assert_eq!(
        table_path(&simdir, "make_table"),
        Some(csv_path.to_string_lossy().to_string())
    );

    let loaded = load_table(&csv_path.to_string_lossy()).unwrap();
    let bin_path = dir.join("make_table.bin").to_string_lossy().to_string();
    write_binary(&bin_path, &loaded).unwrap();
    assert_eq!(table_path(&simdir, "make_table"), Some(bin_path.clone()));
    assert_eq!(load_table(&bin_path).unwrap(), loaded);
    assert_eq!(table_path(&simdir, "use_table"), None);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_a_simdir() {
    let dir = scratch_dir("simdir");
    let files = [
        ("make_table", "F4Z,sctg,name,prob\n61,07,06001,1\n"),
        ("use_table", "F4Z,sctg,name,prob\n411,07,41051,1\n"),
        ("make_local", "county,sctg,numa,p\n06001,07,N1,1\n"),
        ("use_local", "county,sctg,numa,p\n41051,07,N2,1\n"),
        ("ie_nodes", "F4Z,mode,name,prob\n61,1,LAX,1\n"),
        (
            "faf_trucks",
            "dms_orig,dms_dest,sctg,fr_inmode,fr_outmode,type,trucks\n61,411,07,,,SU,5\n",
        ),
    ];
    for (name, contents) in files {
        std::fs::write(dir.join(format!("{}.csv", name)), contents).unwrap();
    }
    let simdir = dir.to_string_lossy().to_string();

    let inputs = load_simdir(&simdir, &mut Timer::throwaway()).unwrap();
    assert_eq!(inputs.flows.len(), 1);
    assert!(inputs.tables.make_local.contains("06001", "07"));
    assert!(inputs.tables.import_export.contains("61", "1"));
    assert!(inputs.tables.facilities.is_empty());

    std::fs::remove_file(dir.join("ie_nodes.csv")).unwrap();
    assert!(load_simdir(&simdir, &mut Timer::throwaway()).is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn simdir_reads_every_named_table() {
    let dir = scratch_dir("named");
    let contents = [
        "F4Z,sctg,name,prob\n61,07,06001,1\n",
        "F4Z,sctg,name,prob\n411,07,41051,1\n",
        "county,sctg,numa,p\n06001,07,N1,1\n",
        "county,sctg,numa,p\n41051,07,N2,1\n",
        "F4Z,mode,name,prob\n61,1,LAX,1\n",
        "name,x,y,numa\nLAX,-118.4,33.9,N7\n",
        "dms_orig,dms_dest,sctg,fr_inmode,fr_outmode,type,trucks\n61,411,07,1,,SU,5\n",
    ];
    for (name, contents) in TABLE_NAMES.iter().zip(contents) {
        std::fs::write(dir.join(format!("{}.csv", name)), contents).unwrap();
    }
    let simdir = dir.to_string_lossy().to_string();

    let inputs = load_simdir(&simdir, &mut Timer::throwaway()).unwrap();
    assert_eq!(inputs.tables.facilities.get("LAX").unwrap().numa, Some("N7".to_string()));
    assert!(inputs.tables.use_local.contains("41051", "07"));
    assert_eq!(inputs.flows[0].in_mode, "1");

    // Every name but the facility coordinates is required
    for name in TABLE_NAMES {
        std::fs::rename(
            dir.join(format!("{}.csv", name)),
            dir.join(format!("{}.hidden", name)),
        )
        .unwrap();
        let result = load_simdir(&simdir, &mut Timer::throwaway());
        assert_eq!(result.is_ok(), name == "facility_coords", "without {}", name);
        std::fs::rename(
            dir.join(format!("{}.hidden", name)),
            dir.join(format!("{}.csv", name)),
        )
        .unwrap();
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn csv_output() {
    let trips = vec![
        record(0, resolved("N1"), resolved("N2"), 100),
        record(1, Point::Unresolved, resolved("41051"), 200),
    ];
    let out = String::from_utf8(write_csv(Vec::new(), &trips).unwrap()).unwrap();
    assert_eq!(
        out,
        "id,origin,destination,config,sctg\n0,N1,N2,SU,07\n1,NA,41051,SU,07\n"
    );
}

#[test]
fn population_output() {
    let mut facilities = FacilityTable::new();
    facilities.insert(
        "LAX",
        Facility {
            x: -118.5,
            y: 33.75,
            numa: None,
        },
    );
    let trips = vec![record(3, resolved("LAX"), Point::Unresolved, 32400)];
    let out =
        String::from_utf8(write_population(Vec::new(), &trips, &facilities).unwrap()).unwrap();

    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE population"));
    assert!(out.contains("population_v5.dtd"));
    assert!(out.contains("<person id=\"3\">"));
    assert!(out.contains("<plan selected=\"yes\">"));
    assert!(out.contains(
        "<act type=\"dummy\" facility=\"LAX\" x=\"-118.5\" y=\"33.75\" end_time=\"32400\"/>"
    ));
    assert!(out.contains("<leg mode=\"car\"/>"));
    assert!(out.contains("<act type=\"dummy\" facility=\"NA\"/>"));
    assert!(out.trim_end().ends_with("</population>"));
}

#[test]
fn gzipped_output() {
    let dir = scratch_dir("gzip");
    let path = dir.join("plans.xml.gz").to_string_lossy().to_string();
    let trips = vec![record(0, resolved("N1"), resolved("N2"), 100)];
    write_trips(&path, OutputFormat::Xml, &trips, &FacilityTable::new()).unwrap();

    let mut decoder = flate2::read::GzDecoder::new(std::fs::File::open(&path).unwrap());
    let mut contents = String::new();
    decoder.read_to_string(&mut contents).unwrap();
    assert!(contents.contains("<person id=\"0\">"));

    let plain = dir.join("plans.csv").to_string_lossy().to_string();
    write_trips(&plain, OutputFormat::Csv, &trips, &FacilityTable::new()).unwrap();
    assert!(std::fs::read_to_string(&plain)
        .unwrap()
        .starts_with("id,origin,destination"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn loaded_tables_report_their_kind() {
    let flows = LoadedTable::Flows(Vec::new());
    assert_eq!(flows.kind(), TableKind::Flows);
    assert!(flows.into_facilities().is_err());
}
