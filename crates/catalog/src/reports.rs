//! The built-in report definitions.
//!
//! Values that used to be hard-coded literals (customer ids, date ranges,
//! cities, thresholds) are `$n` placeholders with named, typed defaults, so a
//! caller can override them without ever touching the SQL text.

use crate::division::Division;
use crate::{ReportDefinition, ReportSection};
use chrono::NaiveDate;
use core_types::{FieldType, TableName, Value};
use rust_decimal::Decimal;

pub const BASIC: &str = "Basic queries with conditions and joins";
pub const AGGREGATION: &str =
    "Queries with aggregation in SELECT and aggregated conditions in HAVING clause";
pub const NESTED: &str = "Queries having nested queries";
pub const NESTED_AGGREGATION: &str = "Queries having aggregation in nested queries";
pub const CORRELATED: &str = "Correlated queries";
pub const DIVISION: &str = "Queries with division operation";

fn date(y: i32, m: u32, d: u32) -> Value {
    NaiveDate::from_ymd_opt(y, m, d).map_or(Value::Null, Value::Date)
}

pub(crate) fn builtin_sections() -> Vec<ReportSection> {
    vec![
        ReportSection::new(BASIC, basic()),
        ReportSection::new(AGGREGATION, aggregation()),
        ReportSection::new(NESTED, nested()),
        ReportSection::new(NESTED_AGGREGATION, nested_aggregation()),
        ReportSection::new(CORRELATED, correlated()),
        ReportSection::new(DIVISION, division()),
    ]
}

fn basic() -> Vec<ReportDefinition> {
    vec![
        ReportDefinition::new(
            "q01",
            BASIC,
            "1. Couriers for a Customer in Date Range",
            "SELECT *
FROM courier
WHERE customer_id::text = $1
  AND date BETWEEN $2 AND $3",
        )
        .param("customer_id", "Customer ID", FieldType::Text, "23110100002")
        .param("from", "From date", FieldType::Date, date(2023, 11, 8))
        .param("to", "To date", FieldType::Date, date(2023, 12, 8)),
        ReportDefinition::new(
            "q02",
            BASIC,
            "2. City Traveled by a Vehicle",
            "SELECT city
FROM vehiclecitymapping
WHERE vehicle_id = $1",
        )
        .param("vehicle_id", "Vehicle ID", FieldType::Text, "GJ06KL0123"),
        ReportDefinition::new(
            "q03",
            BASIC,
            "3. Lost Couriers in Date Range",
            "SELECT *
FROM courier
WHERE status = $1
  AND date BETWEEN $2 AND $3",
        )
        .param("status", "Status", FieldType::Text, "Lost")
        .param("from", "From date", FieldType::Date, date(2024, 1, 1))
        .param("to", "To date", FieldType::Date, date(2024, 1, 10)),
        ReportDefinition::new(
            "q04",
            BASIC,
            "4. Top 5 Most Rated Drivers",
            "SELECT d.id, e.name, d.rating
FROM driver d
JOIN employee e ON d.id = e.employee_id
ORDER BY d.rating DESC
LIMIT 5",
        ),
        ReportDefinition::new(
            "q05",
            BASIC,
            "5. Top 5 Longest Serving Employees",
            "SELECT employee_id, name, date_of_joining
FROM employee
ORDER BY date_of_joining ASC
LIMIT 5",
        ),
        ReportDefinition::new(
            "q06",
            BASIC,
            "6. Active Couriers of a Customer",
            "SELECT c.reference_id, c.date, c.status, c.type, p.amount
FROM customer cu
INNER JOIN courier c ON cu.customer_id = c.customer_id
INNER JOIN payment p ON c.reference_id = p.reference_id
WHERE cu.customer_id::text = $1
  AND c.status IN ('Collected', 'Shipped', 'Arrived')
ORDER BY c.date DESC",
        )
        .param("customer_id", "Customer ID", FieldType::Text, "23110100003"),
    ]
}

fn aggregation() -> Vec<ReportDefinition> {
    vec![
        ReportDefinition::new(
            "q07",
            AGGREGATION,
            "7. Total Weight by City",
            "SELECT SUM(c.weight) AS total_weight
FROM courier c
JOIN branch b ON c.branch_id = b.branch_id
WHERE b.city = $1",
        )
        .param("city", "City", FieldType::Text, "Valsad"),
        ReportDefinition::new(
            "q08",
            AGGREGATION,
            "8. Top 5 Destination Cities for Couriers",
            "SELECT b.city, COUNT(*) AS courier_count
FROM courier c
JOIN branch b ON c.to_branch = b.branch_id
GROUP BY b.city
ORDER BY courier_count DESC
LIMIT 5",
        ),
        ReportDefinition::new(
            "q09",
            AGGREGATION,
            "9. Average Price per Courier for Delivery Partners",
            "SELECT AVG(price_per_courier) AS average_price_per_courier
FROM delivery_partner",
        ),
        ReportDefinition::new(
            "q10",
            AGGREGATION,
            "10. Monthly Profit by Branch",
            "SELECT b.city, SUM(c.profit) AS total_profit
FROM courier c
JOIN branch b ON c.branch_id = b.branch_id
WHERE EXTRACT(MONTH FROM c.date) = $1
  AND EXTRACT(YEAR FROM c.date) = $2
GROUP BY b.city
ORDER BY total_profit DESC",
        )
        .param("month", "Month", FieldType::Integer, 11_i64)
        .param("year", "Year", FieldType::Integer, 2023_i64),
        ReportDefinition::new(
            "q11",
            AGGREGATION,
            "11. Total Couriers and Avg Weight by Vehicle",
            "SELECT COUNT(*) AS total_couriers, AVG(weight) AS average_weight
FROM courier
WHERE vehicle_id = $1",
        )
        .param("vehicle_id", "Vehicle ID", FieldType::Text, "GJ06KL0123"),
        ReportDefinition::new(
            "q12",
            AGGREGATION,
            "12. Branches with Revenue Above Threshold",
            "SELECT b.city, c.branch_id, SUM(c.price) AS total_revenue
FROM courier c
JOIN branch b ON c.branch_id = b.branch_id
GROUP BY b.city, c.branch_id
HAVING SUM(c.price) > $1
ORDER BY total_revenue DESC",
        )
        .param("min_revenue", "Minimum revenue", FieldType::Decimal, Decimal::from(5000)),
        ReportDefinition::new(
            "q13",
            AGGREGATION,
            "13. Customers Who Sent More Than N Couriers",
            "SELECT customer_id, COUNT(*) AS total_couriers
FROM courier
GROUP BY customer_id
HAVING COUNT(*) > $1",
        )
        .param("min_couriers", "More than", FieldType::Integer, 2_i64),
        ReportDefinition::new(
            "q14",
            AGGREGATION,
            "14. Branches With More Than 1 Courier in a Month",
            "SELECT branch_id, COUNT(*) AS courier_count
FROM courier
WHERE EXTRACT(MONTH FROM date) = $1
GROUP BY branch_id
HAVING COUNT(*) > 1",
        )
        .param("month", "Month", FieldType::Integer, 11_i64),
        ReportDefinition::new(
            "q15",
            AGGREGATION,
            "15. Courier Count by Type and Status",
            "SELECT c.type, c.status, COUNT(c.reference_id) AS courier_count
FROM courier c
GROUP BY c.type, c.status
ORDER BY c.type, c.status",
        ),
        ReportDefinition::new(
            "q16",
            AGGREGATION,
            "16. Most Frequently Used Payment Methods",
            "SELECT p.method, COUNT(p.payment_id) AS cnt
FROM payment p
GROUP BY p.method
ORDER BY cnt DESC",
        ),
        ReportDefinition::new(
            "q17",
            AGGREGATION,
            "17. Total Couriers per Delivery Partner",
            "SELECT dp.name, COUNT(cm.reference_id) AS cnt
FROM delivery_partner dp
JOIN couriermapping cm ON dp.registration_number = cm.registration_number
GROUP BY dp.name
ORDER BY cnt DESC",
        ),
        ReportDefinition::new(
            "q18",
            AGGREGATION,
            "18. Most Profitable Courier Types",
            "SELECT c.type, SUM(c.profit) AS total_profit
FROM courier c
GROUP BY c.type
ORDER BY total_profit DESC",
        ),
        ReportDefinition::new(
            "q19",
            AGGREGATION,
            "19. Average Delivery Time by Type",
            "SELECT type, CEIL(AVG(expected_delivery_date - date)) AS average_delivery_time
FROM courier
GROUP BY type",
        ),
    ]
}

fn nested() -> Vec<ReportDefinition> {
    vec![
        ReportDefinition::new(
            "q20",
            NESTED,
            "20. Vehicles Not Assigned to Any Courier",
            "SELECT vehicle_id
FROM vehicle v
WHERE NOT EXISTS (SELECT 1 FROM courier c WHERE c.vehicle_id = v.vehicle_id)",
        ),
        ReportDefinition::new(
            "q21",
            NESTED,
            "21. Customers Without Feedback",
            "SELECT name, contact_of_sender
FROM customer cu
WHERE NOT EXISTS (SELECT 1 FROM feedback f WHERE f.customer_id = cu.customer_id)",
        ),
    ]
}

fn nested_aggregation() -> Vec<ReportDefinition> {
    vec![
        ReportDefinition::new(
            "q22",
            NESTED_AGGREGATION,
            "22. Couriers With Above Average Distance in Branch",
            "SELECT reference_id, distance
FROM courier c1
WHERE distance > (
    SELECT AVG(distance)
    FROM courier c2
    WHERE c1.branch_id = c2.branch_id
)",
        ),
        ReportDefinition::new(
            "q23",
            NESTED_AGGREGATION,
            "23. Vehicles With Capacity Above Average",
            "SELECT vehicle_id, capacity
FROM vehicle
WHERE capacity > (SELECT AVG(capacity) FROM vehicle)",
        ),
        ReportDefinition::new(
            "q24",
            NESTED_AGGREGATION,
            "24. Customers With Above Average Total Payments",
            "SELECT c.customer_id, SUM(p.amount) AS total_payment
FROM payment p
JOIN courier c ON p.reference_id = c.reference_id
GROUP BY c.customer_id
HAVING SUM(p.amount) > (SELECT AVG(amount) FROM payment)",
        ),
        ReportDefinition::new(
            "q25",
            NESTED_AGGREGATION,
            "25. Couriers With Price Above Average",
            "SELECT reference_id, price
FROM courier
WHERE price > (SELECT AVG(price) FROM courier)",
        ),
    ]
}

fn correlated() -> Vec<ReportDefinition> {
    vec![
        ReportDefinition::new(
            "q26",
            CORRELATED,
            "26. Delivery Partners with at Least N Couriers",
            "SELECT dp.name
FROM delivery_partner dp
WHERE dp.registration_number IN (
    SELECT cm.registration_number
    FROM couriermapping cm
    WHERE dp.registration_number = cm.registration_number
    GROUP BY cm.registration_number
    HAVING COUNT(cm.reference_id) >= $1
)",
        )
        .param("min_couriers", "At least", FieldType::Integer, 3_i64),
        ReportDefinition::new(
            "q27",
            CORRELATED,
            "27. Drivers With Rating Below Adjusted Average",
            "SELECT e.*, d.vehicle_id
FROM driver d
JOIN employee e ON d.id = e.employee_id
WHERE d.id IN (
    SELECT d2.id
    FROM driver d2
    WHERE d.id = d2.id
    GROUP BY d2.id
    HAVING MAX(d2.rating) < (SELECT AVG(rating) / 1.2 FROM driver)
)",
        ),
    ]
}

fn division() -> Vec<ReportDefinition> {
    let drivers = Division {
        result_table: TableName::Employee,
        result_key: "employee_id",
        candidates: "SELECT id FROM driver",
        divisor: "SELECT DISTINCT type FROM courier",
        pairs: "SELECT d.id, c.type FROM driver d JOIN courier c ON d.vehicle_id = c.vehicle_id",
    };
    let branches = Division {
        result_table: TableName::Branch,
        result_key: "branch_id",
        candidates: "SELECT branch_id FROM branch",
        divisor: "SELECT DISTINCT status FROM courier",
        pairs: "SELECT branch_id, status FROM courier",
    };
    let promotions = Division {
        result_table: TableName::Promotion,
        result_key: "promotion_id",
        candidates: "SELECT DISTINCT promotion_id FROM vehiclepromotionmapping",
        divisor: "SELECT vehicle_id FROM vehicle",
        pairs: "SELECT promotion_id, vehicle_id FROM vehiclepromotionmapping",
    };

    vec![
        ReportDefinition::new(
            "q28",
            DIVISION,
            "28. Drivers Who Drove Couriers of All Types",
            drivers.to_sql(),
        ),
        ReportDefinition::new(
            "q29",
            DIVISION,
            "29. Branches Managing Couriers of All Statuses",
            branches.to_sql(),
        ),
        ReportDefinition::new(
            "q30",
            DIVISION,
            "30. Promotions Done by All Vehicles",
            promotions.to_sql(),
        ),
    ]
}
