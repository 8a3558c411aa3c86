use std::io::{BufRead, Write};

use crate::error::{PredictError, ShellError};
use crate::eta::{estimate, Estimate};
use crate::features::{is_integer, RawInputs};
use crate::metadata::FeatureMetadata;
use crate::model::Predictor;
use crate::part_of_day::classify;

const BANNER: &str = "Food Delivery ETA Prediction\n\
Estimates the time taken for a food delivery from the trip details below.\n\
Press enter to keep the default shown in brackets.\n";

/// Terminal form: prompts for every trip attribute, shows the derived part of
/// day, then prints the model's estimate.
pub struct Shell<'a, R, W> {
    meta: &'a FeatureMetadata,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(meta: &'a FeatureMetadata, input: R, output: W) -> Self {
        Self {
            meta,
            input,
            output,
        }
    }

    /// Runs predictions until the user declines another one or input ends.
    pub fn run<P: Predictor + ?Sized>(&mut self, predictor: &P) -> Result<(), ShellError> {
        writeln!(self.output, "{BANNER}")?;
        loop {
            let Some(raw) = self.collect_inputs()? else {
                break;
            };
            let result = estimate(predictor, raw);
            if let Err(e) = &result {
                tracing::warn!(error = %e, "prediction failed");
            }
            self.render(&result)?;

            write!(self.output, "Predict another? [y/N]: ")?;
            self.output.flush()?;
            match self.read_line()? {
                Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
                _ => break,
            }
        }
        Ok(())
    }

    /// Collects one full set of inputs; `None` if input ends midway.
    pub fn collect_inputs(&mut self) -> Result<Option<RawInputs>, ShellError> {
        macro_rules! ask {
            ($e:expr) => {
                match $e? {
                    Some(v) => v,
                    None => return Ok(None),
                }
            };
        }

        let courier_age = ask!(self.prompt_number("Delivery_person_Age", "Delivery Person Age")) as i64;
        let courier_rating = ask!(self.prompt_number("Delivery_person_Ratings", "Delivery Person Ratings"));
        let vehicle_condition = ask!(self.prompt_number("Vehicle_condition", "Vehicle Condition")) as i64;
        let multiple_deliveries = ask!(self.prompt_number("multiple_deliveries", "Multiple Deliveries")) as i64;
        let distance_km = ask!(self.prompt_number("distance_km", "Distance (km)"));
        let festival = ask!(self.prompt_choice("Festival", "Festival"));
        let weather_condition = ask!(self.prompt_choice("Weatherconditions", "Weather Conditions"));
        let road_traffic_density = ask!(self.prompt_choice("Road_traffic_density", "Road Traffic Density"));
        let vehicle_type = ask!(self.prompt_choice("Type_of_vehicle", "Type of Vehicle"));
        let city = ask!(self.prompt_choice("City", "City"));
        let hour_placed = ask!(self.prompt_number("Hour_Placed", "Hour Placed")) as i64;

        writeln!(self.output, "Part of Day: {}", classify(hour_placed))?;

        Ok(Some(RawInputs {
            courier_age,
            courier_rating,
            vehicle_condition,
            multiple_deliveries,
            distance_km,
            hour_placed,
            weather_condition,
            road_traffic_density,
            vehicle_type,
            festival,
            city,
        }))
    }

    pub fn render(&mut self, result: &Result<Estimate, PredictError>) -> Result<(), ShellError> {
        match result {
            Ok(est) => writeln!(self.output, "{}", est.message())?,
            Err(e) => writeln!(self.output, "Prediction failed: {e}")?,
        }
        Ok(())
    }

    fn prompt_number(&mut self, field: &str, label: &str) -> Result<Option<f64>, ShellError> {
        let (min, max) = self.meta.range(field)?;
        let default = self.meta.default_value(field)?;
        let integer = is_integer(field);
        let show = |v: f64| {
            if integer {
                format!("{v:.0}")
            } else {
                format!("{v}")
            }
        };

        loop {
            write!(
                self.output,
                "{label} [{}-{}, default {}]: ",
                show(min),
                show(max),
                show(default)
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(default));
            }
            let parsed = if integer {
                line.parse::<i64>().ok().map(|v| v as f64)
            } else {
                line.parse::<f64>().ok()
            };
            match parsed {
                Some(v) => match self.meta.check_number(field, v) {
                    Ok(()) => {
                        let snapped = self.meta.snap(field, v)?;
                        if snapped != v {
                            writeln!(
                                self.output,
                                "  using {} (steps of {})",
                                show(snapped),
                                self.meta.step(field)
                            )?;
                        }
                        return Ok(Some(snapped));
                    }
                    Err(e) => writeln!(self.output, "  {e}")?,
                },
                None => writeln!(self.output, "  '{line}' is not a valid number")?,
            }
        }
    }

    fn prompt_choice(&mut self, field: &str, label: &str) -> Result<Option<String>, ShellError> {
        let choices = self.meta.choices(field)?.to_vec();
        let default = self.meta.default_choice(field)?.to_string();

        writeln!(self.output, "{label}:")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {choice}", i + 1)?;
        }

        loop {
            write!(
                self.output,
                "choose [1-{}, default {default}]: ",
                choices.len()
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(default));
            }
            let picked = match line.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => Some(choices[n - 1].clone()),
                _ => choices
                    .iter()
                    .find(|c| c.as_str() == line)
                    .or_else(|| choices.iter().find(|c| c.eq_ignore_ascii_case(&line)))
                    .cloned(),
            };
            match picked {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "  '{line}' is not one of the listed options")?,
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, ShellError> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::TripFeatures;
    use crate::metadata::tests::sample_metadata;
    use crate::part_of_day::PartOfDay;
    use std::io::Cursor;

    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _: &TripFeatures) -> Result<f64, PredictError> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Broken;

    impl Predictor for Broken {
        fn predict(&self, _: &TripFeatures) -> Result<f64, PredictError> {
            Err(PredictError::SchemaMismatch("Order_Date".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    const SCENARIO: &str = "30\n4.5\n1\n1\n5.0\nNo\nSunny\nLow\nmotorcycle\nUrban\n14\n";

    fn run_shell<P: Predictor>(predictor: &P, input: &str) -> String {
        let meta = sample_metadata();
        let mut out = Vec::new();
        Shell::new(&meta, Cursor::new(input.as_bytes()), &mut out)
            .run(predictor)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scenario_prints_part_of_day_and_rounded_eta() {
        let out = run_shell(&Fixed(23.456), &format!("{SCENARIO}n\n"));
        assert!(out.contains("Part of Day: Afternoon"), "{out}");
        assert!(
            out.contains("The Estimated Time of Arrival is:\n 23.5 minutes"),
            "{out}"
        );
    }

    #[test]
    fn collects_typed_values() {
        let meta = sample_metadata();
        let mut out = Vec::new();
        let raw = Shell::new(&meta, Cursor::new(SCENARIO.as_bytes()), &mut out)
            .collect_inputs()
            .unwrap()
            .unwrap();
        assert_eq!(raw.courier_age, 30);
        assert_eq!(raw.courier_rating, 4.5);
        assert_eq!(raw.hour_placed, 14);
        assert_eq!(raw.vehicle_type, "motorcycle");
        assert_eq!(raw.festival, "No");
    }

    #[test]
    fn empty_answers_take_defaults() {
        let meta = sample_metadata();
        let mut out = Vec::new();
        let raw = Shell::new(&meta, Cursor::new("\n".repeat(11).as_bytes()), &mut out)
            .collect_inputs()
            .unwrap()
            .unwrap();
        assert_eq!(raw, meta.defaults().unwrap());
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(&format!("Part of Day: {}", PartOfDay::Morning)));
    }

    #[test]
    fn invalid_answers_reprompt() {
        let meta = sample_metadata();
        let mut out = Vec::new();
        let input = "99\nabc\n30\n4.5\n1\n1\n5.0\n2\nsunny\nLow\nmotorcycle\nTokyo\n3\n25\n20\n";
        let raw = Shell::new(&meta, Cursor::new(input.as_bytes()), &mut out)
            .collect_inputs()
            .unwrap()
            .unwrap();
        assert_eq!(raw.courier_age, 30);
        assert_eq!(raw.festival, "Yes");
        assert_eq!(raw.weather_condition, "Sunny");
        assert_eq!(raw.city, "Semi-Urban");
        assert_eq!(raw.hour_placed, 20);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("outside [15, 50]"), "{out}");
        assert!(out.contains("'abc' is not a valid number"));
        assert!(out.contains("'Tokyo' is not one of the listed options"));
        assert!(out.contains("Part of Day: Evening"));
    }

    #[test]
    fn off_grid_numbers_snap_to_the_step() {
        let meta = sample_metadata();
        let mut out = Vec::new();
        let input = "30\n4.537\n1\n1\n5.0\nNo\nSunny\nLow\nmotorcycle\nUrban\n14\n";
        let raw = Shell::new(&meta, Cursor::new(input.as_bytes()), &mut out)
            .collect_inputs()
            .unwrap()
            .unwrap();
        assert_eq!(raw.courier_rating, 4.5);
        assert_eq!(raw.distance_km, 4.97);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("using 4.5 (steps of 0.1)"), "{out}");
        assert!(out.contains("using 4.97 (steps of 0.1)"), "{out}");
    }

    #[test]
    fn eof_mid_form_ends_quietly() {
        let meta = sample_metadata();
        let mut out = Vec::new();
        let raw = Shell::new(&meta, Cursor::new("30\n4.5\n".as_bytes()), &mut out)
            .collect_inputs()
            .unwrap();
        assert!(raw.is_none());
    }

    #[test]
    fn failures_are_rendered_and_session_continues() {
        let out = run_shell(&Broken, &format!("{SCENARIO}y\n{SCENARIO}n\n"));
        assert_eq!(out.matches("Prediction failed: schema mismatch").count(), 2);
        assert!(!out.contains("Estimated Time of Arrival"));
    }
}
