use chrono::NaiveDate;
use salesboard::charts::Trace;
use salesboard::data::{LoaderError, TableError, TextEncoding, DEFAULT_ENCODINGS};
use salesboard::server::{self, ApiState};
use salesboard::{Dashboard, DashboardEvent, HousingTable, SalesTable};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SALES_CSV: &str = "\
ORDERNUMBER,QUANTITYORDERED,PRICEEACH,ORDERLINENUMBER,SALES,ORDERDATE,STATUS,PRODUCTLINE
10107,30,95.7,2,2871,2/24/2003 0:00,Shipped,Motorcycles
10121,34,81.35,5,2765.9,5/7/2003 0:00,Shipped,Motorcycles
10134,41,94.74,2,3884.34,7/1/2003 0:00,Shipped,Classic Cars
10145,45,83.26,6,3746.7,8/25/2003 0:00,Shipped,Classic Cars
10159,49,100,14,5205.27,10/10/2003 0:00,Shipped,Classic Cars
10168,36,96.66,1,3479.76,10/28/2003 0:00,Shipped,Trucks and Buses
10180,29,86.13,9,2497.77,11/11/2003 0:00,Shipped,Motorcycles
10188,48,100,1,5512.32,11/18/2003 0:00,Shipped,Ships
10201,22,98.57,2,2168.54,12/1/2003 0:00,Shipped,Vintage Cars
10211,41,100,14,4708.44,1/15/2004 0:00,Shipped,Planes
10223,37,100,1,3965.66,2/20/2004 0:00,Shipped,Trains
10237,23,100,7,2333.12,4/5/2004 0:00,Shipped,Classic Cars
";

const HOUSING_CSV: &str = "\
longitude,latitude,median_income,median_house_value,ocean_proximity
-122.23,37.88,8.3252,452600.0,NEAR BAY
-122.22,37.86,8.3014,358500.0,NEAR BAY
-121.24,39.37,1.7,77100.0,INLAND
-118.30,34.26,2.5,141000.0,<1H OCEAN
";

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

#[test]
fn sales_csv_loads_and_drives_the_dashboard() {
    let file = write_temp(SALES_CSV.as_bytes());
    let table = SalesTable::load(file.path(), &DEFAULT_ENCODINGS).unwrap();
    assert_eq!(table.row_count(), 12);

    let dashboard = Dashboard::new(table, 5).unwrap();
    assert_eq!(
        dashboard.options(),
        ["Classic Cars", "Motorcycles", "Ships", "Planes", "Trains"]
            .map(String::from)
            .as_slice()
    );

    let charts = dashboard
        .handle(&DashboardEvent::ProductLineSelected("Motorcycles".into()))
        .unwrap();
    let Trace::Scatter(line) = &charts.monthly_sales.data[0] else {
        panic!("expected a line trace");
    };
    assert_eq!(line.y.len(), 3);
    assert!((line.y[0] - 30.0 * 95.7).abs() < 1e-9);
    let json = charts.price_vs_sales.to_json().unwrap();
    assert!(json.contains("\"yaxis2\""));
    assert!(json.contains("\"2003-02-01\""));
}

#[test]
fn sales_column_is_recomputed_not_read() {
    let file = write_temp(SALES_CSV.as_bytes());
    let table = SalesTable::load(file.path(), &DEFAULT_ENCODINGS).unwrap();
    let series = table.time_series("Classic Cars").unwrap();
    let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    assert_eq!(dates.first(), NaiveDate::from_ymd_opt(2003, 7, 1).as_ref());
    assert_eq!(dates.last(), NaiveDate::from_ymd_opt(2004, 4, 1).as_ref());
    assert!((series[0].sales - 41.0 * 94.74).abs() < 1e-9);
}

#[test]
fn windows_1252_file_is_read_once_the_loader_reaches_it() {
    let csv = b"ORDERDATE,PRODUCTLINE,QUANTITYORDERED,PRICEEACH\n\
                2024-01-05,\x80 Specials,2,10.0\n";
    let file = write_temp(csv);
    let table = SalesTable::load(
        file.path(),
        &[TextEncoding::Utf8, TextEncoding::Windows1252],
    )
    .unwrap();
    let top = table.top_n_by_category(1).unwrap();
    assert_eq!(top[0].product_line, "€ Specials");
    assert_eq!(top[0].sales, 20.0);
}

#[test]
fn undecodable_file_aborts_the_load() {
    let file = write_temp(b"ORDERDATE,PRODUCTLINE\n2024-01-05,\x81\x9D\xFF\n");
    let err = SalesTable::load(
        file.path(),
        &[TextEncoding::Utf8, TextEncoding::Windows1252],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TableError::Load(LoaderError::DataLoad { .. })
    ));
}

#[test]
fn malformed_order_date_aborts_the_load() {
    let file = write_temp(
        b"ORDERDATE,PRODUCTLINE,QUANTITYORDERED,PRICEEACH\n2024-01-05,A,1,1\nsoon,A,1,1\n",
    );
    let err = SalesTable::load(file.path(), &DEFAULT_ENCODINGS).unwrap_err();
    assert!(matches!(err, TableError::Derive(_)));
    assert!(err.to_string().contains("soon"));
}

async fn get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn housing_api_serves_chart_descriptions() {
    let file = write_temp(HOUSING_CSV.as_bytes());
    let housing = HousingTable::load(file.path(), &DEFAULT_ENCODINGS).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, Arc::new(ApiState::new(housing))));

    let home = get(addr, "/").await;
    assert!(home.starts_with("HTTP/1.1 200 OK"));
    assert!(home.ends_with("Housing Dashboard API"));

    let histogram = get(addr, "/api/price_distribution").await;
    assert!(histogram.starts_with("HTTP/1.1 200 OK"));
    assert!(histogram.contains("content-type: application/json"));
    assert!(histogram.contains("Distribution of Housing Prices"));

    let scatter = get(addr, "/api/scatter_plot").await;
    assert!(scatter.contains("\"name\":\"<1H OCEAN\""));

    let missing = get(addr, "/api/unknown").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"));
}

#[test]
fn blank_product_line_rows_stay_out_of_every_total() {
    let file = write_temp(
        b"ORDERDATE,PRODUCTLINE,QUANTITYORDERED,PRICEEACH\n2024-01-05,A,2,10.0\n2024-01-06,,3,10.0\n",
    );
    let table = SalesTable::load(file.path(), &DEFAULT_ENCODINGS).unwrap();
    let distribution: f64 = table
        .category_distribution()
        .unwrap()
        .iter()
        .map(|t| t.sales)
        .sum();
    assert_eq!(distribution, 20.0);
    assert_eq!(table.grand_total().unwrap(), distribution);
}
