use crate::dicom::Element;
use crate::ingest::{IngestReport, TagQuery};

pub fn print_report(report: &IngestReport, verbose: bool) {
    print_field("File ID", &report.file_id);
    print_field("Duplicate", if report.is_duplicate { "yes" } else { "no" });
    print_field("Fingerprint", &report.fingerprint.to_string());

    print_field("Transfer Syntax", &report.transfer_syntax.to_string());

    print_tag(&report.tag);

    match &report.png {
        Ok(png) => println!("{:20}: {} bytes", "PNG", png.len()),
        Err(e) => print_field("PNG Error", &e.to_string()),
    }

    if verbose {
        for attribute in &report.attributes {
            print_field(&attribute.name, &attribute.value);
        }
    }
}

fn print_field(name: &str, value: &str) {
    println!("{name:20}: {value}");
}

fn print_tag(tag: &TagQuery) {
    match tag {
        TagQuery::NotRequested => {}
        TagQuery::Found(element) => print_element(element),
        TagQuery::NotFound(tag) => println!("{:20}: {} not found", "Tag", tag),
    }
}

fn print_element(element: &Element) {
    println!(
        "{:20}: {} {} [{}]",
        "Tag",
        element.tag,
        element.keyword().unwrap_or("Unknown"),
        element.vr
    );
    print_field("Value", &element.value.to_string());
}
