/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 24/09/2018
Last Modified: 18/10/2019
License: MIT
*/

use whitebox_raster::*;
use whitebox_common::structures::Point2D;
use crate::tools::core_interop::{print_banner, to_core_i16, to_core_i32};
use crate::tools::*;
use whitebox_vector::ShapefileGeometry;
use whitebox_vector::*;
use std::collections::HashSet;
use std::env;
use std::f64;
use std::io::{Error, ErrorKind};
use std::path;
use whitebox_stream_network::dirmap::DirMap;
use whitebox_stream_network::walker::walk;

/// This tool converts a raster stream file into a vector file. The user must specify: 1)
/// the name of the raster streams file, 2) the name of the D8 flow pointer file,
/// and 3) the name of the output vector file. Streams in the input raster streams
/// file are denoted by cells containing any positive, non-zero integer. A field in
/// the vector database file, called STRM_VAL, will correspond to this positive
/// integer value. The database file will also have a field for the length of each
/// link in the stream network. The flow pointer file must be calculated from a DEM with
/// all topographic depressions and flat areas removed and must be calculated using the
/// D8 flow pointer algorithm. The output vector will contain PolyLine features.
///
/// # See Also
/// `RasterizeStreams`, `RasterToVectorLines`
pub struct RasterStreamsToVector {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl RasterStreamsToVector {
    pub fn new() -> RasterStreamsToVector {
        // public constructor
        let name = "RasterStreamsToVector".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description = "Converts a raster stream file into a vector file.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Streams File".to_owned(),
            flags: vec!["--streams".to_owned()],
            description: "Input raster streams file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["--d8_pntr".to_owned()],
            description: "Input raster D8 pointer file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
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

        parameters.push(ToolParameter {
            name: "Do all stream pixels should be represented by a vertex?".to_owned(),
            flags: vec!["--keep_all_vertices".to_owned()],
            description: "Avoid any simplification of the output vector.".to_owned(),
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
        let usage = format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --streams=streams.tif --d8_pntr=D8.tif -o=output.shp
>>.*{0} -r={1} -v --wd=\"*path*to*data*\" --streams=streams.tif --d8_pntr=D8.tif -o=output.shp --esri_pntr", short_exe, name).replace("*", &sep);

        RasterStreamsToVector {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WhiteboxTool for RasterStreamsToVector {
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
        let mut output_file = String::new();
        let mut esri_style = false;
        let mut keep_all_vertices = false;

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
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-esri_pntr" || flag_val == "-esri_style" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    esri_style = true;
                };
            } else if flag_val == "-keep_all_vertices" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    keep_all_vertices = true;
                }
            }
        }

        if verbose {
            print_banner(&self.get_tool_name());
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();

        let mut progress: usize;
        let mut old_progress: usize = 1;

        if !d8_file.contains(&sep) && !d8_file.contains("/") {
            d8_file = format!("{}{}", working_directory, d8_file);
        }
        if !streams_file.contains(&sep) && !streams_file.contains("/") {
            streams_file = format!("{}{}", working_directory, streams_file);
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

        let start = Instant::now();

        let rows = pntr.configs.rows as isize;
        let columns = pntr.configs.columns as isize;
        let num_cells = pntr.num_cells();
        let nodata = streams.configs.nodata;

        // make sure the input files have the same size
        if streams.configs.rows != pntr.configs.rows
            || streams.configs.columns != pntr.configs.columns
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input files must have the same number of rows and columns and spatial extent.",
            ));
        }

        // create output file
        let mut output = Shapefile::new(&output_file, ShapeType::PolyLine)?;

        // add the attributes
        output
            .attributes
            .add_field(&AttributeField::new("FID", FieldDataType::Int, 7u8, 0u8));
        output.attributes.add_field(&AttributeField::new(
            "STRM_VAL",
            FieldDataType::Real,
            10u8,
            3u8,
        ));

        // Remap onto the ESRI D8 codes the core's DirMap assumes, same
        // convention `StrahlerStreamOrder` uses.
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

        // The input streams raster already carries its own pre-assigned
        // segment values (STRM_VAL); unlike `StrahlerStreamOrder` this tool
        // does not re-derive link IDs with `links::label_links` — it
        // preserves whatever distinct values the caller's streams raster
        // holds. A headwater is a stream cell with no same-raster neighbour
        // flowing into it; a link ends wherever the walk leaves the
        // headwater's value (a value change, a confluence where more than
        // one same-valued arm joins, or a sink/out-of-bounds/nodata cell).
        let mut num_inflowing: whitebox_stream_network::raster::Raster<i32> =
            whitebox_stream_network::raster::Raster::new(streams_core.meta.clone(), -1, -1);
        let mut stack: Vec<(isize, isize)> = Vec::with_capacity((rows * columns) as usize);
        let mut num_solved_cells = 0usize;
        for row in 0..rows {
            for col in 0..columns {
                if streams_core.get(row, col) > 0 {
                    let mut count = 0i32;
                    for code in whitebox_stream_network::dirmap::ESRI_CODES {
                        let (dr, dc) = DirMap::step(code as i16);
                        let (nr, nc) = (row - dr, col - dc);
                        if streams_core.get(nr, nc) > 0 {
                            let (sdr, sdc) = DirMap::step(pntr_core.get(nr, nc));
                            if (nr + sdr, nc + sdc) == (row, col) {
                                count += 1;
                            }
                        }
                    }
                    num_inflowing.set(row, col, count);
                    if count == 0 {
                        stack.push((row, col));
                    }
                } else {
                    num_solved_cells += 1;
                }
            }
            if verbose {
                progress = (100.0_f64 * num_solved_cells as f64 / (num_cells - 1) as f64) as usize;
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }

        let mut visited: HashSet<(isize, isize)> = HashSet::new();
        let mut current_id = 1i32;
        while let Some((row0, col0)) = stack.pop() {
            if visited.contains(&(row0, col0)) {
                continue;
            }
            let in_val = streams_core.get(row0, col0);

            let path = walk((row0, col0), &pntr_core, |next| {
                streams_core.get(next.0, next.1) != in_val || num_inflowing.get(next.0, next.1) != 1
            });
            for &cell in &path {
                visited.insert(cell);
            }

            // if the walk stopped at a same-valued confluence cell, queue it
            // so its own link (once every other arm has reached it) still
            // gets emitted.
            if let Some(&last) = path.last() {
                let code = pntr_core.get(last.0, last.1);
                if !DirMap::is_sink(code) {
                    let (dr, dc) = DirMap::step(code);
                    let next = (last.0 + dr, last.1 + dc);
                    if streams_core.get(next.0, next.1) > 0 && !visited.contains(&next) {
                        stack.push(next);
                    }
                }
            }

            let mut points: Vec<Point2D> = Vec::with_capacity(path.len() + 1);
            let mut prev_dir = i16::MIN;
            for (i, &(r, c)) in path.iter().enumerate() {
                let dir = pntr_core.get(r, c);
                let is_last = i == path.len() - 1;
                if keep_all_vertices || dir != prev_dir || is_last {
                    let (x, y) = streams_core.meta.transform.pixel_to_world(r, c);
                    points.push(Point2D::new(x, y));
                    prev_dir = dir;
                }
            }
            // append the junction/outlet cell beyond the path, matching the
            // teacher's "always emit one more point past the descent" rule.
            if let Some(&last) = path.last() {
                let code = pntr_core.get(last.0, last.1);
                if !DirMap::is_sink(code) {
                    let (dr, dc) = DirMap::step(code);
                    let tail = (last.0 + dr, last.1 + dc);
                    if tail.0 >= 0 && tail.1 >= 0 && tail.0 < rows && tail.1 < columns {
                        let (x, y) = streams_core.meta.transform.pixel_to_world(tail.0, tail.1);
                        let p = Point2D::new(x, y);
                        if points.last() != Some(&p) {
                            points.push(p);
                        }
                    }
                }
            }

            if points.len() > 1 {
                let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
                sfg.add_part(&points);
                output.add_record(sfg);
                output.attributes.add_record(
                    vec![FieldData::Int(current_id), FieldData::Real(in_val as f64)],
                    false,
                );
                current_id += 1;
            }

            if verbose {
                num_solved_cells += path.len();
                progress = (100.0_f64 * num_solved_cells as f64 / (num_cells - 1) as f64) as usize;
                if progress != old_progress {
                    println!("Progress: {}%", progress);
                    old_progress = progress;
                }
            }
        }
        let _ = nodata;

        let elapsed_time = get_formatted_elapsed_time(start);
        output.add_metadata_entry(format!(
            "Created by whitebox_tools\' {} tool",
            self.get_tool_name()
        ));

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
