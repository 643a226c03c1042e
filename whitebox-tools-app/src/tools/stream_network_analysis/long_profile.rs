/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 20/02/2018
Last Modified: 18/10/2019
License: MIT
*/

use whitebox_raster::*;
use crate::tools::core_interop::{print_banner, to_core_f64, to_core_i16, to_core_i32};
use crate::tools::*;
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufWriter;
use std::io::{Error, ErrorKind};
use std::path;
use whitebox_stream_network::nodes::find_nodes;
use whitebox_stream_network::reaches::build_profile;
use whitebox_stream_network::walker::walk;

/// This tool can be used to create a longitudinal stream profile: a table of elevation against
/// downstream distance. Most long profiles use distance from channel head as the distance measure.
/// This tool, however, uses the distance to the stream network outlet cell, or mouth, as the distance
/// measure. The reason for this difference is that while for any one location within a stream network
/// there is only ever one downstream outlet, there is usually many upstream channel heads. Thus plotted
/// using the traditional downstream-distance method, the same point within a network will plot in many
/// different long profile locations, whereas it will always plot in one unique location in the
/// distance-to-mouth method.
///
/// The user must specify the names of a D8 pointer (`--d8_pntr`) image (flow direction), a streams
/// raster image (`--streams`), and a digital elevation model (`--dem`). Stream cells are designated in
/// the streams image as all positive, nonzero values. The pointer image is used to traverse the stream
/// network and should only be created using the D8 algorithm (`D8Pointer`). The output is a CSV table,
/// one row per `(profile_id, distance_from_mouth, elevation)` sample, with one profile per channel head;
/// where two heads' paths converge onto a shared trunk, the trunk is reported only once, under the
/// longer of the two contributing profiles.
///
/// By default, the pointer raster is assumed to use the clockwise indexing method used by WhiteboxTools.
/// If the pointer file contains ESRI flow direction values instead, the `--esri_pntr` parameter must be specified.
///
/// # See Also
/// `LongProfileFromPoints`, `Profile`, `D8Pointer`
pub struct LongProfile {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl LongProfile {
    pub fn new() -> LongProfile {
        // public constructor
        let name = "LongProfile".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description =
            "Plots the stream longitudinal profiles for one or more rivers.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["--d8_pntr".to_owned()],
            description: "Input raster D8 pointer file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input Streams File".to_owned(),
            flags: vec!["--streams".to_owned()],
            description: "Input raster streams file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input DEM File".to_owned(),
            flags: vec!["--dem".to_owned()],
            description: "Input raster DEM file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output CSV File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output CSV file, one row per (profile_id, distance, elevation) sample."
                .to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Csv),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Does the pointer file use the ESRI pointer scheme?".to_owned(),
            flags: vec!["--esri_pntr".to_owned()],
            description: "D8 pointer uses the ESRI style scheme.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let e = format!("{}", env::current_exe().unwrap().display());
        let mut parent = env::current_exe().unwrap();
        parent.pop();
        let p = format!("{}", parent.display());
        let mut short_exe = e
            .replace(&p, "")
            .replace(".exe", "")
            .replace(".", "")
            .replace(&sep, "");
        if e.contains(".exe") {
            short_exe += ".exe";
        }
        let usage = format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --d8_pntr=D8.tif --streams=streams.tif --dem=dem.tif -o=output.csv --esri_pntr", short_exe, name).replace("*", &sep);

        LongProfile {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WhiteboxTool for LongProfile {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        let mut s = String::from("{\"parameters\": [");
        for i in 0..self.parameters.len() {
            if i < self.parameters.len() - 1 {
                s.push_str(&(self.parameters[i].to_string()));
                s.push_str(",");
            } else {
                s.push_str(&(self.parameters[i].to_string()));
            }
        }
        s.push_str("]}");
        s
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut d8_file = String::new();
        let mut streams_file = String::new();
        let mut dem_file = String::new();
        let mut output_file = String::new();
        let mut esri_style = false;

        if args.len() == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace("\"", "");
            arg = arg.replace("\'", "");
            let cmd = arg.split("="); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let mut keyval = false;
            if vec.len() > 1 {
                keyval = true;
            }
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-d8_pntr" {
                d8_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-streams" {
                streams_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-dem" {
                dem_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-esri_pntr" || flag_val == "-esri_style" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    esri_style = true;
                }
            }
        }

        if verbose {
            print_banner(&self.get_tool_name());
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();

        if !d8_file.contains(&sep) && !d8_file.contains("/") {
            d8_file = format!("{}{}", working_directory, d8_file);
        }
        if !streams_file.contains(&sep) && !streams_file.contains("/") {
            streams_file = format!("{}{}", working_directory, streams_file);
        }
        if !dem_file.contains(&sep) && !dem_file.contains("/") {
            dem_file = format!("{}{}", working_directory, dem_file);
        }
        if !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", working_directory, output_file);
        }

        if verbose {
            println!("Reading pointer data...")
        };
        let pntr = Raster::new(&d8_file, "r")?;
        if verbose {
            println!("Reading streams data...")
        };
        let streams = Raster::new(&streams_file, "r")?;
        if verbose {
            println!("Reading DEM data...")
        };
        let dem = Raster::new(&dem_file, "r")?;

        let start = Instant::now();

        // make sure the input files have the same size
        if streams.configs.rows != pntr.configs.rows
            || streams.configs.columns != pntr.configs.columns
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input files must have the same number of rows and columns and spatial extent.",
            ));
        }
        if dem.configs.rows != pntr.configs.rows || dem.configs.columns != pntr.configs.columns {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input files must have the same number of rows and columns and spatial extent.",
            ));
        }

        let mut pntr_core = to_core_i16(&pntr);
        if !esri_style {
            const WB_TO_ESRI: [(i16, i16); 8] = [
                (1, 128),
                (2, 1),
                (4, 2),
                (8, 4),
                (16, 8),
                (32, 16),
                (64, 32),
                (128, 64),
            ];
            let rows = pntr.configs.rows as isize;
            let columns = pntr.configs.columns as isize;
            for row in 0..rows {
                for col in 0..columns {
                    let v = pntr_core.get(row, col);
                    if let Some(&(_, esri)) = WB_TO_ESRI.iter().find(|&&(wb, _)| wb == v) {
                        pntr_core.set(row, col, esri);
                    }
                }
            }
        }
        let streams_core = to_core_i32(&streams);
        let dem_core = to_core_f64(&dem);

        if verbose {
            println!("Finding channel heads...");
        }
        let nodes = find_nodes(&streams_core, &pntr_core);
        let heads = nodes.sources;

        if verbose {
            println!("Traversing streams...");
        }
        // Full head-to-mouth path for every channel head, stopping as soon as
        // the walk leaves the stream network (sink or non-stream neighbour).
        let paths: Vec<Vec<(isize, isize)>> = heads
            .iter()
            .map(|&head| walk(head, &pntr_core, |next| streams_core.get(next.0, next.1) == 0))
            .collect();

        let profiles: Vec<Vec<whitebox_stream_network::reaches::ReachPoint>> = paths
            .iter()
            .map(|path| build_profile(path, &dem_core))
            .collect();

        // A cell may be visited by more than one head's path when two
        // tributaries share a downstream trunk; the longer-distance
        // traversal "owns" the shared trunk so it is only reported once.
        let mut owner: HashMap<(isize, isize), (usize, f64)> = HashMap::new();
        for (h, profile) in profiles.iter().enumerate() {
            for p in profile {
                let cell = (p.row, p.col);
                let claim = owner.get(&cell).map(|&(_, d)| d).unwrap_or(f64::MIN);
                if p.distance > claim {
                    owner.insert(cell, (h, p.distance));
                }
            }
        }

        let mut xdata: Vec<Vec<f64>> = Vec::new();
        let mut ydata: Vec<Vec<f64>> = Vec::new();
        for (h, profile) in profiles.iter().enumerate() {
            let total = match profile.last() {
                Some(p) => p.distance,
                None => continue,
            };
            let mut profile_xdata = Vec::with_capacity(profile.len());
            let mut profile_ydata = Vec::with_capacity(profile.len());
            for p in profile {
                let cell = (p.row, p.col);
                profile_xdata.push(total - p.distance);
                profile_ydata.push(p.elevation);
                if owner.get(&cell).map(|&(owner_h, _)| owner_h) != Some(h) {
                    break;
                }
            }

            let n = profile_xdata.len();
            if n > 1 {
                if profile_xdata[n - 1] == 0f64 {
                    // Otherwise the origin of the plot won't be at zero.
                    profile_xdata[n - 1] = 0.0000001f64;
                }
                xdata.push(profile_xdata);
                ydata.push(profile_ydata);
            }
        }

        let f = File::create(output_file.clone())?;
        let mut writer = BufWriter::new(f);

        writer.write_all(b"profile_id,distance_from_mouth,elevation\n")?;
        for (profile_id, (xs, ys)) in xdata.iter().zip(ydata.iter()).enumerate() {
            for (x, y) in xs.iter().zip(ys.iter()) {
                writer.write_all(format!("{},{:.4},{:.4}\n", profile_id, x, y).as_bytes())?;
            }
        }

        let _ = writer.flush();

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!(
                "\n{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
            println!("Complete! Please see {} for output.", output_file);
        }

        Ok(())
    }
}
