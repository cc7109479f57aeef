use super::*;

const HEADER: &str = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n";

fn wide(body: &str) -> WideCsvReader<&[u8]> {
    WideCsvReader::new(body.as_bytes()).unwrap()
}

fn paired<'a>(left: &'a str, right: &'a str) -> Result<PairedRowReader<&'a [u8], &'a [u8]>, SourceError> {
    PairedRowReader::new("confirmed", wide(left), "deaths", wide(right))
}

#[test]
fn aligned_feeds_yield_row_pairs() {
    let confirmed = format!("{HEADER},Testland,1.0,2.0,5,8\nQuebec,Canada,3.0,4.0,1,2\n");
    let deaths = format!("{HEADER},Testland,1.0,2.0,0,1\nQuebec,Canada,3.0,4.0,0,0\n");

    let mut reader = paired(&confirmed, &deaths).unwrap();
    let (c, d) = reader.next_pair().unwrap().unwrap();
    assert_eq!(c.counts, vec![5, 8]);
    assert_eq!(d.counts, vec![0, 1]);

    let (c, d) = reader.next_pair().unwrap().unwrap();
    assert_eq!(c.location.province, "Quebec");
    assert_eq!(d.location.province, "Quebec");

    assert!(reader.next_pair().unwrap().is_none());
    assert_eq!(reader.rows_read(), 2);
}

#[test]
fn deaths_feed_ending_early_is_an_alignment_error() {
    let confirmed = format!("{HEADER},A,1.0,2.0,1,1\n,B,1.0,2.0,1,1\n");
    let deaths = format!("{HEADER},A,1.0,2.0,0,0\n");

    let mut reader = paired(&confirmed, &deaths).unwrap();
    assert!(reader.next_pair().unwrap().is_some());
    let err = reader.next_pair().unwrap_err();
    match err {
        SourceError::Alignment(AlignmentError::RowCountMismatch {
            exhausted, rows, ..
        }) => {
            assert_eq!(exhausted, "deaths");
            assert_eq!(rows, 1);
        }
        other => panic!("expected row count mismatch, got {other:?}"),
    }
}

#[test]
fn confirmed_feed_ending_early_is_an_alignment_error() {
    let confirmed = HEADER.to_string();
    let deaths = format!("{HEADER},A,1.0,2.0,0,0\n");

    let mut reader = paired(&confirmed, &deaths).unwrap();
    let err = reader.next_pair().unwrap_err();
    assert!(matches!(
        err,
        SourceError::Alignment(AlignmentError::RowCountMismatch {
            exhausted: "confirmed",
            ..
        })
    ));
}

#[test]
fn differing_locations_are_an_alignment_error() {
    let confirmed = format!("{HEADER},Testland,1.0,2.0,1,1\n");
    let deaths = format!("{HEADER},Otherland,1.0,2.0,0,0\n");

    let err = paired(&confirmed, &deaths).unwrap().next_pair().unwrap_err();
    assert!(matches!(
        err,
        SourceError::Alignment(AlignmentError::LocationMismatch { row: 1, .. })
    ));
}

// Upstream publishes both feeds from the same pipeline, so their date
// columns are assumed equal. The reader refuses to zip feeds whose headers
// disagree instead of trusting that assumption.
#[test]
fn differing_date_columns_are_rejected_up_front() {
    let confirmed = format!("{HEADER},A,1.0,2.0,1,1\n");
    let deaths = "p,c,lat,long,1/22/20,1/23/20,1/24/20\n,A,1.0,2.0,0,0,0\n";

    let err = paired(&confirmed, deaths).err().unwrap();
    match err {
        SourceError::Alignment(AlignmentError::HeaderMismatch {
            left_dates,
            right_dates,
            column,
            ..
        }) => {
            assert_eq!(left_dates, 2);
            assert_eq!(right_dates, 3);
            assert_eq!(column, 6);
        }
        other => panic!("expected header mismatch, got {other:?}"),
    }
}

#[test]
fn shifted_dates_report_first_differing_column() {
    let confirmed = format!("{HEADER},A,1.0,2.0,1,1\n");
    let deaths = "p,c,lat,long,1/22/20,1/25/20\n,A,1.0,2.0,0,0\n";

    let err = paired(&confirmed, deaths).err().unwrap();
    assert!(matches!(
        err,
        SourceError::Alignment(AlignmentError::HeaderMismatch { column: 5, .. })
    ));
}

#[test]
fn field_errors_pass_through() {
    let confirmed = format!("{HEADER},A,1.0,2.0,1,oops\n");
    let deaths = format!("{HEADER},A,1.0,2.0,0,0\n");

    let err = paired(&confirmed, &deaths).unwrap().next_pair().unwrap_err();
    assert!(matches!(err, SourceError::Field { .. }));
}
