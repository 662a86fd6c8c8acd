//! Built-in low-precision ephemeris backend.
//!
//! Sign-level accuracy (well under 1° for 1800-2050) from closed-form
//! series: solar equation of center, a truncated lunar longitude series,
//! Keplerian mean elements for Mercury-Pluto, the mean lunar node, and a
//! sidereal-time ascendant with equal house cusps. No external data files,
//! no network.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

use crate::ephemeris::{ChartRequest, Ephemeris, EphemerisError, Node, Planet, RawBody, RawChart};

const J2000: f64 = 2451545.0;

/// Keplerian element validity window for the planet table.
const YEAR_MIN: i32 = 1800;
const YEAR_MAX: i32 = 2050;

pub struct MeeusEphemeris;

impl Ephemeris for MeeusEphemeris {
    fn compute(&self, request: &ChartRequest) -> Result<RawChart, EphemerisError> {
        let year = request.date.year();
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(EphemerisError::OutOfRange(year));
        }

        let offset = parse_offset(&request.utc_offset)
            .ok_or_else(|| EphemerisError::InvalidOffset(request.utc_offset.clone()))?;
        let position = request.position.decode().ok_or_else(|| {
            EphemerisError::InvalidCoordinate(format!(
                "{} {}",
                request.position.latitude, request.position.longitude
            ))
        })?;

        let local = NaiveDateTime::new(request.date, request.time);
        let utc: DateTime<Utc> = local
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| EphemerisError::InvalidOffset(request.utc_offset.clone()))?
            .with_timezone(&Utc);
        let jd = julian_day(utc);

        let mut bodies = BTreeMap::new();
        for planet in Planet::ALL {
            let lon = geocentric_longitude(planet, centuries(jd));
            // Daily motion from a centered one-day difference; negative
            // values are retrograde.
            let before = geocentric_longitude(planet, centuries(jd - 0.5));
            let after = geocentric_longitude(planet, centuries(jd + 0.5));
            let speed = wrap180(after - before);
            bodies.insert(planet, RawBody { lon, speed });
        }

        let north = mean_lunar_node(centuries(jd));
        let mut nodes = BTreeMap::new();
        nodes.insert(Node::North, north);
        nodes.insert(Node::South, norm360(north + 180.0));

        let ascendant = ascendant(jd, position.latitude, position.longitude);
        let houses = equal_houses(ascendant);

        Ok(RawChart {
            bodies,
            nodes,
            ascendant,
            houses,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Time
// ────────────────────────────────────────────────────────────────────────────

fn julian_day(utc: DateTime<Utc>) -> f64 {
    2440587.5 + utc.timestamp() as f64 / 86_400.0
}

/// Julian centuries from J2000.0.
fn centuries(jd: f64) -> f64 {
    (jd - J2000) / 36_525.0
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let bytes = offset.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = offset.get(1..3)?.parse().ok()?;
    let minutes: i32 = offset.get(4..6)?.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// ────────────────────────────────────────────────────────────────────────────
// Angles
// ────────────────────────────────────────────────────────────────────────────

fn norm360(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Reduces to [-180, 180).
fn wrap180(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Mean obliquity of the ecliptic, degrees.
fn obliquity(t: f64) -> f64 {
    23.439_291_11 - 0.013_004_2 * t
}

// ────────────────────────────────────────────────────────────────────────────
// Sun and Moon
// ────────────────────────────────────────────────────────────────────────────

/// Geometric solar longitude: mean longitude plus equation of center.
fn sun_longitude(t: f64) -> f64 {
    let l0 = 280.46646 + 36_000.76983 * t + 0.000_303_2 * t * t;
    let m = (357.52911 + 35_999.05029 * t - 0.000_153_7 * t * t).to_radians();
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    norm360(l0 + c)
}

/// Lunar longitude from the ten largest periodic terms (Meeus ch. 47).
fn moon_longitude(t: f64) -> f64 {
    let lp = 218.316_447_7 + 481_267.881_234_21 * t;
    let d = (297.850_192_1 + 445_267.111_403_4 * t).to_radians();
    let m = (357.529_109_2 + 35_999.050_290_9 * t).to_radians();
    let mp = (134.963_396_4 + 477_198.867_505_5 * t).to_radians();
    let f = (93.272_095_0 + 483_202.017_523_3 * t).to_radians();

    norm360(
        lp + 6.288_774 * mp.sin()
            + 1.274_027 * (2.0 * d - mp).sin()
            + 0.658_314 * (2.0 * d).sin()
            + 0.213_618 * (2.0 * mp).sin()
            - 0.185_116 * m.sin()
            - 0.114_332 * (2.0 * f).sin()
            + 0.058_793 * (2.0 * d - 2.0 * mp).sin()
            + 0.057_066 * (2.0 * d - m - mp).sin()
            + 0.053_322 * (2.0 * d + mp).sin()
            + 0.045_758 * (2.0 * d - m).sin(),
    )
}

/// Mean longitude of the ascending lunar node.
fn mean_lunar_node(t: f64) -> f64 {
    norm360(125.044_547_9 - 1_934.136_289_1 * t + 0.002_075_4 * t * t)
}

// ────────────────────────────────────────────────────────────────────────────
// Planets — Keplerian mean elements (1800-2050 table)
// ────────────────────────────────────────────────────────────────────────────

/// Mean orbital elements at J2000 plus per-century rates:
/// semi-major axis (au), eccentricity, inclination, mean longitude,
/// longitude of perihelion, longitude of the ascending node (degrees).
struct Elements {
    a: f64,
    e: f64,
    i: f64,
    l: f64,
    peri: f64,
    node: f64,
    da: f64,
    de: f64,
    di: f64,
    dl: f64,
    dperi: f64,
    dnode: f64,
}

#[rustfmt::skip]
const MERCURY: Elements = Elements { a: 0.387_099_27, e: 0.205_635_93, i: 7.004_979_02, l: 252.250_323_50, peri: 77.457_796_28, node: 48.330_765_93, da: 0.000_000_37, de: 0.000_019_06, di: -0.005_947_49, dl: 149_472.674_111_75, dperi: 0.160_476_89, dnode: -0.125_340_81 };
#[rustfmt::skip]
const VENUS: Elements = Elements { a: 0.723_335_66, e: 0.006_776_72, i: 3.394_676_05, l: 181.979_099_50, peri: 131.602_467_18, node: 76.679_842_55, da: 0.000_003_90, de: -0.000_041_07, di: -0.000_788_90, dl: 58_517.815_387_29, dperi: 0.002_683_29, dnode: -0.277_694_18 };
#[rustfmt::skip]
const EARTH_MOON_BARYCENTER: Elements = Elements { a: 1.000_002_61, e: 0.016_711_23, i: -0.000_015_31, l: 100.464_571_66, peri: 102.937_681_93, node: 0.0, da: 0.000_005_62, de: -0.000_043_92, di: -0.012_946_68, dl: 35_999.372_449_81, dperi: 0.323_273_64, dnode: 0.0 };
#[rustfmt::skip]
const MARS: Elements = Elements { a: 1.523_710_34, e: 0.093_394_10, i: 1.849_691_42, l: -4.553_432_05, peri: -23.943_629_59, node: 49.559_538_91, da: 0.000_018_47, de: 0.000_078_82, di: -0.008_131_31, dl: 19_140.302_684_99, dperi: 0.444_410_88, dnode: -0.292_573_43 };
#[rustfmt::skip]
const JUPITER: Elements = Elements { a: 5.202_887_00, e: 0.048_386_24, i: 1.304_396_95, l: 34.396_440_51, peri: 14.728_479_83, node: 100.473_909_09, da: -0.000_116_07, de: -0.000_132_53, di: -0.001_837_14, dl: 3_034.746_127_75, dperi: 0.212_526_68, dnode: 0.204_691_06 };
#[rustfmt::skip]
const SATURN: Elements = Elements { a: 9.536_675_94, e: 0.053_861_79, i: 2.485_991_87, l: 49.954_244_23, peri: 92.598_878_31, node: 113.662_424_48, da: -0.001_250_60, de: -0.000_509_91, di: 0.001_936_09, dl: 1_222.493_622_01, dperi: -0.418_972_16, dnode: -0.288_677_94 };
#[rustfmt::skip]
const URANUS: Elements = Elements { a: 19.189_164_64, e: 0.047_257_44, i: 0.772_637_83, l: 313.238_104_51, peri: 170.954_276_30, node: 74.016_925_03, da: -0.001_961_76, de: -0.000_043_97, di: -0.002_429_39, dl: 428.482_027_85, dperi: 0.408_052_81, dnode: 0.042_405_89 };
#[rustfmt::skip]
const NEPTUNE: Elements = Elements { a: 30.069_922_76, e: 0.008_590_48, i: 1.770_043_47, l: -55.120_029_69, peri: 44.964_762_27, node: 131.784_225_74, da: 0.000_262_91, de: 0.000_051_05, di: 0.000_353_72, dl: 218.459_453_25, dperi: -0.322_414_64, dnode: -0.005_086_64 };
#[rustfmt::skip]
const PLUTO: Elements = Elements { a: 39.482_116_75, e: 0.248_827_30, i: 17.140_012_06, l: 238.929_038_33, peri: 224.068_916_29, node: 110.303_936_84, da: -0.000_315_96, de: 0.000_051_70, di: 0.000_048_18, dl: 145.207_805_15, dperi: -0.040_629_42, dnode: -0.011_834_82 };

/// Solves Kepler's equation for the eccentric anomaly, degrees.
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let e_star = e.to_degrees();
    let mut anomaly = mean_anomaly + e_star * mean_anomaly.to_radians().sin();
    for _ in 0..10 {
        let delta_m = mean_anomaly - (anomaly - e_star * anomaly.to_radians().sin());
        let delta = delta_m / (1.0 - e * anomaly.to_radians().cos());
        anomaly += delta;
        if delta.abs() < 1e-7 {
            break;
        }
    }
    anomaly
}

/// Heliocentric ecliptic x/y (au) from mean elements at time t.
fn heliocentric(elements: &Elements, t: f64) -> (f64, f64) {
    let a = elements.a + elements.da * t;
    let e = elements.e + elements.de * t;
    let i = (elements.i + elements.di * t).to_radians();
    let l = elements.l + elements.dl * t;
    let peri = elements.peri + elements.dperi * t;
    let node = (elements.node + elements.dnode * t).to_radians();

    let mean_anomaly = wrap180(l - peri);
    let anomaly = eccentric_anomaly(mean_anomaly, e).to_radians();

    // Orbital-plane coordinates, perihelion on +x.
    let xp = a * (anomaly.cos() - e);
    let yp = a * (1.0 - e * e).sqrt() * anomaly.sin();

    let w = (peri - node.to_degrees()).to_radians();
    let x = (w.cos() * node.cos() - w.sin() * node.sin() * i.cos()) * xp
        + (-w.sin() * node.cos() - w.cos() * node.sin() * i.cos()) * yp;
    let y = (w.cos() * node.sin() + w.sin() * node.cos() * i.cos()) * xp
        + (-w.sin() * node.sin() + w.cos() * node.cos() * i.cos()) * yp;
    (x, y)
}

fn planet_longitude(elements: &Elements, t: f64) -> f64 {
    let (px, py) = heliocentric(elements, t);
    let (ex, ey) = heliocentric(&EARTH_MOON_BARYCENTER, t);
    norm360((py - ey).atan2(px - ex).to_degrees())
}

fn geocentric_longitude(planet: Planet, t: f64) -> f64 {
    match planet {
        Planet::Sun => sun_longitude(t),
        Planet::Moon => moon_longitude(t),
        Planet::Mercury => planet_longitude(&MERCURY, t),
        Planet::Venus => planet_longitude(&VENUS, t),
        Planet::Mars => planet_longitude(&MARS, t),
        Planet::Jupiter => planet_longitude(&JUPITER, t),
        Planet::Saturn => planet_longitude(&SATURN, t),
        Planet::Uranus => planet_longitude(&URANUS, t),
        Planet::Neptune => planet_longitude(&NEPTUNE, t),
        Planet::Pluto => planet_longitude(&PLUTO, t),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ascendant and houses
// ────────────────────────────────────────────────────────────────────────────

fn ascendant(jd: f64, latitude: f64, longitude: f64) -> f64 {
    let t = centuries(jd);
    let gmst = norm360(
        280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    );
    let ramc = norm360(gmst + longitude).to_radians();
    let eps = obliquity(t).to_radians();
    // tan(lat) diverges at the poles; clamp keeps the formula finite.
    let lat = latitude.clamp(-89.9, 89.9).to_radians();

    norm360(
        ramc.cos()
            .atan2(-(ramc.sin() * eps.cos() + lat.tan() * eps.sin()))
            .to_degrees(),
    )
}

/// Twelve equal cusps from the ascendant.
fn equal_houses(ascendant: f64) -> [f64; 12] {
    std::array::from_fn(|i| norm360(ascendant + 30.0 * i as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::geopos::EncodedCoordinate;
    use crate::models::birth::GeoCoordinate;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    const NYC: GeoCoordinate = GeoCoordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    fn request(date: &str, time: &str, offset: &str, coordinate: GeoCoordinate) -> ChartRequest {
        ChartRequest {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            utc_offset: offset.to_string(),
            position: EncodedCoordinate::from_decimal(coordinate),
        }
    }

    #[test]
    fn test_julian_day_j2000_epoch() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_day(epoch) - J2000).abs() < 1e-6);
    }

    #[test]
    fn test_sun_longitude_mid_june_is_gemini_range() {
        let chart = MeeusEphemeris
            .compute(&request("1995-06-15", "12:00", "-04:00", NYC))
            .unwrap();
        let sun = chart.bodies[&Planet::Sun];
        assert!(
            (60.0..90.0).contains(&sun.lon),
            "mid-June sun should sit in the Gemini sector, got {}",
            sun.lon
        );
    }

    #[test]
    fn test_sun_longitude_new_year_is_capricorn_range() {
        let chart = MeeusEphemeris
            .compute(&request("2000-01-01", "12:00", "+00:00", NYC))
            .unwrap();
        let sun = chart.bodies[&Planet::Sun];
        assert!(
            (270.0..300.0).contains(&sun.lon),
            "new-year sun should sit in the Capricorn sector, got {}",
            sun.lon
        );
    }

    #[test]
    fn test_all_longitudes_normalized() {
        let chart = MeeusEphemeris
            .compute(&request("1987-11-03", "23:45", "+05:30", GeoCoordinate {
                latitude: 28.6139,
                longitude: 77.2090,
            }))
            .unwrap();
        for (planet, body) in &chart.bodies {
            assert!(
                (0.0..360.0).contains(&body.lon),
                "{planet} longitude out of range: {}",
                body.lon
            );
        }
        for lon in chart.nodes.values() {
            assert!((0.0..360.0).contains(lon));
        }
        assert!((0.0..360.0).contains(&chart.ascendant));
    }

    #[test]
    fn test_daily_motion_plausible_for_luminaries() {
        let chart = MeeusEphemeris
            .compute(&request("1995-06-15", "12:00", "-04:00", NYC))
            .unwrap();
        let sun = chart.bodies[&Planet::Sun];
        assert!((0.9..1.1).contains(&sun.speed), "sun speed {}", sun.speed);
        let moon = chart.bodies[&Planet::Moon];
        assert!((10.0..16.5).contains(&moon.speed), "moon speed {}", moon.speed);
    }

    #[test]
    fn test_nodes_are_opposed() {
        let chart = MeeusEphemeris
            .compute(&request("1995-06-15", "12:00", "-04:00", NYC))
            .unwrap();
        let north = chart.nodes[&Node::North];
        let south = chart.nodes[&Node::South];
        assert!((wrap180(south - north - 180.0)).abs() < 1e-9);
    }

    #[test]
    fn test_houses_are_twelve_equal_sectors_from_ascendant() {
        let chart = MeeusEphemeris
            .compute(&request("1995-06-15", "12:00", "-04:00", NYC))
            .unwrap();
        assert_eq!(chart.houses.len(), 12);
        assert!((chart.houses[0] - chart.ascendant).abs() < 1e-9);
        for window in chart.houses.windows(2) {
            assert!((wrap180(window[1] - window[0] - 30.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_year_outside_element_table_rejected() {
        let err = MeeusEphemeris
            .compute(&request("1750-06-15", "12:00", "+00:00", NYC))
            .unwrap_err();
        assert!(matches!(err, EphemerisError::OutOfRange(1750)));
    }

    #[test]
    fn test_malformed_offset_rejected() {
        let mut bad = request("1995-06-15", "12:00", "+00:00", NYC);
        bad.utc_offset = "UTC+1".to_string();
        let err = MeeusEphemeris.compute(&bad).unwrap_err();
        assert!(matches!(err, EphemerisError::InvalidOffset(_)));
    }

    #[test]
    fn test_parse_offset_signs() {
        assert_eq!(
            parse_offset("-05:00"),
            FixedOffset::east_opt(-5 * 3600)
        );
        assert_eq!(
            parse_offset("+05:30"),
            FixedOffset::east_opt(5 * 3600 + 30 * 60)
        );
        assert_eq!(parse_offset("05:30"), None);
        assert_eq!(parse_offset("+5:30"), None);
    }
}
