/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 25/06/2017
Last Modified: 18/10/2019
License: MIT
*/

use whitebox_raster::*;
use crate::tools::core_interop::{print_banner, to_core_f64, to_core_i16, to_core_i32};
use crate::tools::*;
use std::collections::HashSet;
use std::env;
use std::f64;
use std::io::{Error, ErrorKind};
use std::path;
use whitebox_stream_network::dirmap::DirMap;
use whitebox_stream_network::links::label_links;
use whitebox_stream_network::reaches::{reach_val, segment_reaches, ReachOptions};
use whitebox_stream_network::report::NullReporter;
use whitebox_stream_network::walker::walk;

/// This tool segments each link of a stream network into reaches of homogeneous slope. It must be supplied a
/// streams raster image (`--streams`), a D8 pointer image (`--d8_pntr`), and a digital elevation model
/// (`--dem`). For each link, the tool orders the link's cells from upstream to downstream, builds the
/// cumulative-distance/elevation/slope profile along that path, and finds changepoints in the along-channel
/// slope signal using a PELT/RBF search with a minimum reach length of `--min_length` map units. Adjacent
/// candidate reaches whose median slope differs by less than `--threshold` degrees are then merged, and the
/// final reaches for a link are renumbered starting at zero. The output raster carries
/// `reach_id + stream_id * 1000` at each stream cell, so that reaches from different links never collide.
///
/// Stream cells are designated in the streams image as all positive, nonzero values. The pointer image is used
/// to traverse the stream network and should only be created using the D8 algorithm. By default, the pointer
/// raster is assumed to use the clockwise indexing method used by WhiteboxTools; if the pointer file contains
/// ESRI flow direction values instead, the `--esri_pntr` parameter must be specified.
///
/// # See Also
/// `StrahlerStreamOrder`, `LongProfile`, `StreamSlopeContinuous`
pub struct DelineateReaches {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl DelineateReaches {
    pub fn new() -> DelineateReaches {
        // public constructor
        let name = "DelineateReaches".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description =
            "Segments each stream link into reaches of homogeneous slope using changepoint detection."
                .to_string();

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
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Minimum Reach Length".to_owned(),
            flags: vec!["--min_length".to_owned()],
            description: "Minimum reach length, in map units, a changepoint may not fall closer together than this.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("500.0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Merge Threshold".to_owned(),
            flags: vec!["--threshold".to_owned()],
            description: "Adjacent reaches whose median slope differs by less than this, in degrees, are merged.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("1.0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Smoothing Window Size".to_owned(),
            flags: vec!["--smooth_window".to_owned()],
            description: "Window size, in cells, for a centered rolling mean applied to the slope signal before changepoint detection; 0 or 1 disables smoothing.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Does the pointer file use the ESRI pointer scheme?".to_owned(),
            flags: vec!["--esri_pntr".to_owned()],
            description: "D8 pointer uses the ESRI style scheme.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Should a background value of zero be used?".to_owned(),
            flags: vec!["--zero_background".to_owned()],
            description: "Flag indicating whether a background value of zero should be used."
                .to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: None,
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
        let usage = format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --d8_pntr=D8.tif --streams=streams.tif --dem=dem.tif -o=output.tif
>>.*{0} -r={1} -v --wd=\"*path*to*data*\" --d8_pntr=D8.tif --streams=streams.tif --dem=dem.tif -o=output.tif --min_length=250.0 --threshold=2.0 --esri_pntr", short_exe, name).replace("*", &sep);

        DelineateReaches {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WhiteboxTool for DelineateReaches {
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
        let mut background_val = f64::NEG_INFINITY;
        let mut min_length = 500.0f64;
        let mut threshold_degrees = 1.0f64;
        let mut smooth_window = 0usize;

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
            } else if flag_val == "-min_length" {
                min_length = if keyval {
                    vec[1].to_string().parse::<f64>().unwrap_or(500.0)
                } else {
                    args[i + 1].to_string().parse::<f64>().unwrap_or(500.0)
                };
            } else if flag_val == "-threshold" {
                threshold_degrees = if keyval {
                    vec[1].to_string().parse::<f64>().unwrap_or(1.0)
                } else {
                    args[i + 1].to_string().parse::<f64>().unwrap_or(1.0)
                };
            } else if flag_val == "-smooth_window" {
                smooth_window = if keyval {
                    vec[1].to_string().parse::<usize>().unwrap_or(0)
                } else {
                    args[i + 1].to_string().parse::<usize>().unwrap_or(0)
                };
            } else if flag_val == "-esri_pntr" || flag_val == "-esri_style" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    esri_style = true;
                }
            } else if flag_val == "-zero_background" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    background_val = 0f64;
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

        let rows = pntr.configs.rows as isize;
        let columns = pntr.configs.columns as isize;
        let pntr_nodata = pntr.configs.nodata;
        let streams_nodata = streams.configs.nodata;
        if background_val == f64::NEG_INFINITY {
            background_val = streams_nodata;
        }

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

        let mut output = Raster::initialize_using_file(&output_file, &streams);
        output.reinitialize_values(background_val);

        // Whitebox-style codes use a different offset mapping than the
        // ESRI-style codes the core crate's `dirmap` table assumes; remap
        // onto the equivalent ESRI code before handing the pointer grid to
        // the core (see `DirMap`'s own grounding note for the offset table).
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
            println!("Labeling stream links...")
        };
        let mut reporter = NullReporter;
        let link_labels = label_links(&streams_core, &pntr_core, &mut reporter, None)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;

        let mut segment_ids: Vec<u32> = link_labels
            .iter_cells()
            .map(|(r, c)| link_labels.get(r, c))
            .filter(|&v| v > 0)
            .collect();
        segment_ids.sort_unstable();
        segment_ids.dedup();

        let opts = ReachOptions {
            penalty: None,
            min_length,
            smooth_window: if smooth_window > 1 {
                Some(smooth_window)
            } else {
                None
            },
            threshold_degrees,
        };

        let num_segments = segment_ids.len();
        for (i, &id) in segment_ids.iter().enumerate() {
            let cells: Vec<(isize, isize)> = link_labels
                .iter_cells()
                .filter(|&(r, c)| link_labels.get(r, c) == id)
                .collect();
            let mask: HashSet<(isize, isize)> = cells.iter().copied().collect();
            // the segment's headwater cell: no in-segment neighbour flows into it.
            let start_cell = cells
                .iter()
                .copied()
                .find(|&(r, c)| {
                    !cells.iter().any(|&(nr, nc)| {
                        (nr, nc) != (r, c) && {
                            let (dr, dc) = DirMap::step(pntr_core.get(nr, nc));
                            (nr + dr, nc + dc) == (r, c)
                        }
                    })
                })
                .unwrap_or(cells[0]);
            let path = walk(start_cell, &pntr_core, |next| !mask.contains(&next));
            if path.len() < 2 {
                reporter.warn(&format!("link {} is a single isolated cell; skipped", id));
                continue;
            }

            let points = segment_reaches(&path, &dem_core, &opts, None)
                .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;
            for p in &points {
                output.set_value(p.row, p.col, reach_val(p.reach_id, id) as f64);
            }

            if verbose {
                let progress = (100.0_f64 * i as f64 / num_segments.max(1) as f64) as usize;
                println!("Progress: {}%", progress);
            }
        }

        for row in 0..rows {
            for col in 0..columns {
                if streams[(row, col)] <= 0.0 {
                    if pntr[(row, col)] != pntr_nodata {
                        output[(row, col)] = background_val;
                    } else {
                        output[(row, col)] = streams_nodata;
                    }
                }
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        output.configs.palette = "qual.plt".to_string();
        output.configs.photometric_interp = PhotometricInterpretation::Categorical;
        output.add_metadata_entry(format!(
            "Created by whitebox_tools\' {} tool",
            self.get_tool_name()
        ));
        output.add_metadata_entry(format!("Input d8 pointer file: {}", d8_file));
        output.add_metadata_entry(format!("Input streams file: {}", streams_file));
        output.add_metadata_entry(format!("Input DEM file: {}", dem_file));
        output.add_metadata_entry(format!("Minimum reach length: {}", min_length));
        output.add_metadata_entry(format!("Merge threshold (degrees): {}", threshold_degrees));
        output.add_metadata_entry(format!("Elapsed Time (excluding I/O): {}", elapsed_time));

        if verbose {
            println!("Saving data...")
        };
        let _ = match output.write() {
            Ok(_) => {
                if verbose {
                    println!("Output file written")
                }
            }
            Err(e) => return Err(e),
        };
        if verbose {
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }

        Ok(())
    }
}
