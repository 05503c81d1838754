use std::io::{BufWriter, Write};

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::Serialize;

use truckplans::{FacilityTable, OutputFormat, Point, TripRecord};

const POPULATION_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE population \
                                 SYSTEM \"http://www.matsim.org/files/dtd/population_v5.dtd\">\n";

/// Write trips to a file in the requested format. Paths ending in `.gz` are gzipped.
pub fn write_trips(
    path: &str,
    format: OutputFormat,
    trips: &[TripRecord],
    facilities: &FacilityTable,
) -> Result<()> {
    let file = BufWriter::new(fs_err::File::create(path)?);
    if path.ends_with(".gz") {
        let encoder = GzEncoder::new(file, Compression::new(4));
        let encoder = write_format(encoder, format, trips, facilities)?;
        encoder.finish()?.flush()?;
    } else {
        write_format(file, format, trips, facilities)?.flush()?;
    }
    info!("Wrote {} trips to {}", truckutil::prettyprint_usize(trips.len()), path);
    Ok(())
}

fn write_format<W: Write>(
    writer: W,
    format: OutputFormat,
    trips: &[TripRecord],
    facilities: &FacilityTable,
) -> Result<W> {
    match format {
        OutputFormat::Csv => write_csv(writer, trips),
        OutputFormat::Xml => write_population(writer, trips, facilities),
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: usize,
    origin: &'a str,
    destination: &'a str,
    config: &'a str,
    sctg: &'a str,
}

/// One row per trip. Unresolved points are written as `NA`. Returns the inner writer once
/// everything has been flushed to it.
pub fn write_csv<W: Write>(writer: W, trips: &[TripRecord]) -> Result<W> {
    let mut writer = csv::Writer::from_writer(writer);
    for trip in trips {
        writer.serialize(CsvRow {
            id: trip.id.0,
            origin: trip.origin.as_str(),
            destination: trip.destination.as_str(),
            config: &trip.config,
            sctg: &trip.sctg,
        })?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("couldn't flush CSV output: {}", err.error()))
}

/// An agent-based population: every truck is a person with one plan, leaving the origin activity
/// at its departure time and driving to the destination activity.
pub fn write_population<W: Write>(
    mut writer: W,
    trips: &[TripRecord],
    facilities: &FacilityTable,
) -> Result<W> {
    writer.write_all(POPULATION_HEADER.as_bytes())?;
    let mut xml = quick_xml::Writer::new_with_indent(writer, b' ', 2);

    xml.write_event(Event::Start(BytesStart::borrowed_name(b"population")))?;
    for trip in trips {
        let id = trip.id.to_string();
        let mut person = BytesStart::borrowed_name(b"person");
        person.push_attribute(("id", id.as_str()));
        xml.write_event(Event::Start(person))?;

        let mut plan = BytesStart::borrowed_name(b"plan");
        plan.push_attribute(("selected", "yes"));
        xml.write_event(Event::Start(plan))?;

        let end_time = trip.departure.to_string();
        xml.write_event(Event::Empty(activity(
            &trip.origin,
            facilities,
            Some(&end_time),
        )))?;
        let mut leg = BytesStart::borrowed_name(b"leg");
        leg.push_attribute(("mode", "car"));
        xml.write_event(Event::Empty(leg))?;
        xml.write_event(Event::Empty(activity(&trip.destination, facilities, None)))?;

        xml.write_event(Event::End(BytesEnd::borrowed(b"plan")))?;
        xml.write_event(Event::End(BytesEnd::borrowed(b"person")))?;
    }
    xml.write_event(Event::End(BytesEnd::borrowed(b"population")))?;

    let mut writer = xml.into_inner();
    writer.write_all(b"\n")?;
    Ok(writer)
}

fn activity(
    point: &Point,
    facilities: &FacilityTable,
    end_time: Option<&str>,
) -> BytesStart<'static> {
    let mut act = BytesStart::borrowed_name(b"act");
    act.push_attribute(("type", "dummy"));
    act.push_attribute(("facility", point.as_str()));
    if let Some(facility) = facilities.get(point.as_str()) {
        act.push_attribute(("x", facility.x.to_string().as_str()));
        act.push_attribute(("y", facility.y.to_string().as_str()));
    }
    if let Some(end_time) = end_time {
        act.push_attribute(("end_time", end_time));
    }
    act
}
